//! Staff registration and salary updates.

use rust_decimal::Decimal;
use tracing::info;

use super::{expect_one_row, Bracket, UpdateOutcome, Workflows};
use crate::db::models::{
    DeskRole, ManagerRole, NewStaffMember, Role, StaffMember, StaffRecord, TrainerRole,
};
use crate::error::{AppError, AppResult};
use crate::validation;

/// Raw role input. The variant is the operator's role choice.
#[derive(Debug, Clone)]
pub enum RoleRequest {
    Desk {
        schedule: String,
        desk_location: String,
        responsibility: String,
    },
    Trainer {
        /// Optional
        specialty: String,
        schedule: String,
        certification_level: String,
        experience: String,
    },
    Manager {
        department: String,
        office_location: String,
        /// Optional
        experience: String,
    },
}

impl RoleRequest {
    /// Validate the role-specific fields.
    pub fn validate(&self) -> AppResult<Role> {
        Ok(match self {
            RoleRequest::Desk {
                schedule,
                desk_location,
                responsibility,
            } => Role::Desk(DeskRole {
                schedule: validation::require_schedule(schedule)?,
                desk_location: validation::require_text("Desk location", desk_location)?,
                responsibility: validation::require_text("Responsibility", responsibility)?,
            }),
            RoleRequest::Trainer {
                specialty,
                schedule,
                certification_level,
                experience,
            } => Role::Trainer(TrainerRole {
                specialty: validation::optional_text(specialty),
                schedule: validation::require_schedule(schedule)?,
                certification_level: validation::require_text(
                    "Certification level",
                    certification_level,
                )?,
                experience: validation::require_experience(experience)?,
            }),
            RoleRequest::Manager {
                department,
                office_location,
                experience,
            } => Role::Manager(ManagerRole {
                department: validation::require_text("Department", department)?,
                office_location: validation::require_text("Office location", office_location)?,
                experience: validation::optional_experience(experience)?,
            }),
        })
    }
}

/// Raw operator input for a new staff member.
#[derive(Debug, Clone)]
pub struct RegisterStaffRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub hire_date: String,
    pub salary: String,
    pub role: RoleRequest,
}

impl RegisterStaffRequest {
    fn validate(&self) -> AppResult<(NewStaffMember, Role)> {
        let staff = NewStaffMember {
            first_name: validation::require_name("First name", &self.first_name)?,
            last_name: validation::require_name("Last name", &self.last_name)?,
            phone_number: validation::optional_phone(&self.phone_number)?,
            email: validation::optional_email(&self.email)?,
            hire_date: validation::require_date("Hire date", &self.hire_date)?,
            salary: validation::require_salary(&self.salary)?,
        };
        Ok((staff, self.role.validate()?))
    }
}

impl Workflows {
    /// Insert a staff member and its single role row in one transaction.
    pub async fn register_staff_member(
        &self,
        request: RegisterStaffRequest,
    ) -> AppResult<StaffRecord> {
        let (new, role) = request.validate()?;

        let mut bracket = self.open("register_staff_member").await?;
        let outcome = insert_staff_with_role(&mut bracket, &new, role).await;
        let record = bracket.close(outcome).await?;

        info!(
            staff_id = record.staff.staff_id,
            role = ?record.role.as_ref().map(Role::kind),
            "Staff member registered"
        );
        Ok(record)
    }

    /// Set a staff member's salary.
    pub async fn update_staff_salary(
        &self,
        staff_id: i32,
        salary: &str,
    ) -> AppResult<UpdateOutcome<Decimal>> {
        let staff_id = validation::require_id("staff ID", staff_id)?;
        let salary = validation::require_salary(salary)?;

        let mut bracket = self.open("update_staff_salary").await?;
        let outcome = update_salary_steps(&mut bracket, staff_id, salary).await;
        bracket.close(outcome).await
    }

    /// Staff allowed to process payments, for the shell's pick list.
    pub async fn desk_staff(&self) -> AppResult<Vec<StaffMember>> {
        let mut bracket = self.open("list_desk_staff").await?;
        let outcome = bracket.uow().list_desk_staff().await;
        bracket.release().await?;
        outcome
    }
}

async fn insert_staff_with_role(
    bracket: &mut Bracket,
    new: &NewStaffMember,
    role: Role,
) -> AppResult<StaffRecord> {
    bracket.committing();
    let staff = bracket.uow().insert_staff(new).await?;
    bracket.uow().insert_role(staff.staff_id, &role).await?;
    Ok(StaffRecord {
        staff,
        role: Some(role),
    })
}

async fn update_salary_steps(
    bracket: &mut Bracket,
    staff_id: i32,
    salary: Decimal,
) -> AppResult<UpdateOutcome<Decimal>> {
    let staff = bracket.uow().find_staff(staff_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("Staff member with ID {} does not exist.", staff_id))
    })?;
    if staff.salary == salary {
        return Ok(UpdateOutcome::Unchanged(salary));
    }

    bracket.committing();
    let updated = bracket.uow().update_staff_salary(staff_id, salary).await?;
    expect_one_row(updated, "gym.staff_member")?;
    Ok(UpdateOutcome::Updated {
        before: staff.salary,
        after: salary,
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::{desk_request, fixture, trainer_request};
    use super::*;
    use crate::db::models::RoleKind;
    use crate::error::{ConstrainedField, ErrorKind};
    use crate::store::FailPoint;

    fn manager_request(first: &str, office: &str) -> RegisterStaffRequest {
        RegisterStaffRequest {
            role: RoleRequest::Manager {
                department: "Operations".to_string(),
                office_location: office.to_string(),
                experience: String::new(),
            },
            ..desk_request(first)
        }
    }

    #[tokio::test]
    async fn test_register_each_role() {
        let (store, workflows) = fixture();
        let desk = workflows
            .register_staff_member(desk_request("Dee"))
            .await
            .unwrap();
        let trainer = workflows
            .register_staff_member(trainer_request("Tom"))
            .await
            .unwrap();
        let manager = workflows
            .register_staff_member(manager_request("Max", "B-204"))
            .await
            .unwrap();

        assert_eq!(desk.role.map(|r| r.kind()), Some(RoleKind::Desk));
        assert_eq!(trainer.role.map(|r| r.kind()), Some(RoleKind::Trainer));
        let Some(Role::Manager(m)) = manager.role else {
            panic!("expected manager");
        };
        assert_eq!(m.experience, None);

        let tables = store.snapshot().await;
        assert_eq!(tables.staff.len(), 3);
        assert_eq!(tables.roles.len(), 3);
    }

    #[tokio::test]
    async fn test_role_insert_failure_rolls_back_staff_row() {
        let (store, workflows) = fixture();
        store.fail_on(FailPoint::InsertRole).await;
        let err = workflows
            .register_staff_member(desk_request("Dee"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationalFailure);
        assert!(store.snapshot().await.staff.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_office_location() {
        let (store, workflows) = fixture();
        workflows
            .register_staff_member(manager_request("Max", "B-204"))
            .await
            .unwrap();
        let err = workflows
            .register_staff_member(manager_request("Mia", "B-204"))
            .await
            .unwrap_err();
        let AppError::Constraint(violation) = err else {
            panic!("expected constraint violation");
        };
        assert_eq!(violation.field, Some(ConstrainedField::OfficeLocation));
        assert_eq!(store.snapshot().await.staff.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_role_fields() {
        let (_, workflows) = fixture();
        let bad_schedule = RegisterStaffRequest {
            role: RoleRequest::Desk {
                schedule: "Monday 9-5".to_string(),
                desk_location: "Lobby".to_string(),
                responsibility: "Sales".to_string(),
            },
            ..desk_request("Dee")
        };
        let bad_experience = RegisterStaffRequest {
            role: RoleRequest::Trainer {
                specialty: String::new(),
                schedule: "Mon- 9AM-5PM".to_string(),
                certification_level: "Level 1".to_string(),
                experience: "-2".to_string(),
            },
            ..desk_request("Tom")
        };
        let negative_salary = RegisterStaffRequest {
            salary: "-100".to_string(),
            ..desk_request("Sal")
        };
        for request in [bad_schedule, bad_experience, negative_salary] {
            let err = workflows.register_staff_member(request).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[tokio::test]
    async fn test_update_salary() {
        let (_, workflows) = fixture();
        let desk = workflows
            .register_staff_member(desk_request("Dee"))
            .await
            .unwrap();
        let id = desk.staff.staff_id;

        let outcome = workflows.update_staff_salary(id, "41000").await.unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                before: Decimal::new(38000, 0),
                after: Decimal::new(41000, 0),
            }
        );
        assert!(matches!(
            workflows.update_staff_salary(id, "41000.00").await.unwrap(),
            UpdateOutcome::Unchanged(_)
        ));
        assert_eq!(
            workflows
                .update_staff_salary(id, "-1")
                .await
                .unwrap_err()
                .operator_message(),
            "Error: Salary must be >= 0."
        );
        assert_eq!(
            workflows
                .update_staff_salary(99, "100")
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::Precondition
        );
    }
}
