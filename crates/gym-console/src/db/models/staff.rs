//! Staff member model and its role variants.
//!
//! A staff member has exactly one role, stored as a row in one of the
//! `desk`, `trainer` or `manager` child tables. In Rust the role is a
//! [`Role`] value chosen at creation and never changed afterwards.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Staff member row, without role details.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StaffMember {
    pub staff_id: i32,

    pub first_name: String,

    pub last_name: String,

    /// Ten digits, unique across staff
    pub phone_number: Option<String>,

    /// Unique across staff
    pub email: Option<String>,

    pub hire_date: NaiveDate,

    /// Always `>= 0`
    pub salary: Decimal,
}

/// Validated shared fields for a new staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffMember {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub hire_date: NaiveDate,
    pub salary: Decimal,
}

/// Front desk staff. Only desk staff may process payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskRole {
    pub schedule: String,
    pub desk_location: String,
    pub responsibility: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerRole {
    pub specialty: Option<String>,
    pub schedule: String,
    pub certification_level: String,
    /// Years, `>= 0`
    pub experience: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerRole {
    pub department: String,
    /// Unique across managers
    pub office_location: String,
    pub experience: Option<i32>,
}

/// The single role a staff member holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Desk(DeskRole),
    Trainer(TrainerRole),
    Manager(ManagerRole),
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Desk(_) => RoleKind::Desk,
            Role::Trainer(_) => RoleKind::Trainer,
            Role::Manager(_) => RoleKind::Manager,
        }
    }
}

/// Role discriminant, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Desk,
    Trainer,
    Manager,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoleKind::Desk => "Desk",
            RoleKind::Trainer => "Trainer",
            RoleKind::Manager => "Manager",
        };
        write!(f, "{}", s)
    }
}

/// A staff member together with the role found for it, if any.
///
/// Rows created outside this program may lack a role row, hence the `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub staff: StaffMember,
    pub role: Option<Role>,
}

/// Flat row produced by joining `staff_member` with all three role tables.
#[derive(Debug, Clone, FromRow)]
pub struct StaffRoleRow {
    #[sqlx(flatten)]
    pub staff: StaffMember,

    pub desk_schedule: Option<String>,
    pub desk_location: Option<String>,
    pub responsibility: Option<String>,

    pub trainer_id: Option<i32>,
    pub specialty: Option<String>,
    pub trainer_schedule: Option<String>,
    pub certification_level: Option<String>,
    pub trainer_experience: Option<i32>,

    pub manager_id: Option<i32>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    pub manager_experience: Option<i32>,
}

impl From<StaffRoleRow> for StaffRecord {
    fn from(row: StaffRoleRow) -> Self {
        let role = if let (Some(schedule), Some(desk_location), Some(responsibility)) =
            (row.desk_schedule, row.desk_location, row.responsibility)
        {
            Some(Role::Desk(DeskRole {
                schedule,
                desk_location,
                responsibility,
            }))
        } else if let (Some(_), Some(schedule), Some(certification_level), Some(experience)) = (
            row.trainer_id,
            row.trainer_schedule,
            row.certification_level,
            row.trainer_experience,
        ) {
            Some(Role::Trainer(TrainerRole {
                specialty: row.specialty,
                schedule,
                certification_level,
                experience,
            }))
        } else if let (Some(_), Some(department), Some(office_location)) =
            (row.manager_id, row.department, row.office_location)
        {
            Some(Role::Manager(ManagerRole {
                department,
                office_location,
                experience: row.manager_experience,
            }))
        } else {
            None
        };

        StaffRecord {
            staff: row.staff,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> StaffMember {
        StaffMember {
            staff_id: 1,
            first_name: "Sam".to_string(),
            last_name: "Reyes".to_string(),
            phone_number: None,
            email: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            salary: Decimal::new(4000000, 2),
        }
    }

    fn empty_row() -> StaffRoleRow {
        StaffRoleRow {
            staff: staff(),
            desk_schedule: None,
            desk_location: None,
            responsibility: None,
            trainer_id: None,
            specialty: None,
            trainer_schedule: None,
            certification_level: None,
            trainer_experience: None,
            manager_id: None,
            department: None,
            office_location: None,
            manager_experience: None,
        }
    }

    #[test]
    fn test_trainer_without_specialty() {
        let row = StaffRoleRow {
            trainer_id: Some(1),
            trainer_schedule: Some("Mon-Fri 6AM-2PM".to_string()),
            certification_level: Some("Level 2".to_string()),
            trainer_experience: Some(4),
            ..empty_row()
        };
        let record = StaffRecord::from(row);
        let Some(Role::Trainer(trainer)) = record.role else {
            panic!("expected trainer role");
        };
        assert_eq!(trainer.specialty, None);
        assert_eq!(trainer.experience, 4);
    }

    #[test]
    fn test_manager_role() {
        let row = StaffRoleRow {
            manager_id: Some(1),
            department: Some("Operations".to_string()),
            office_location: Some("B-204".to_string()),
            ..empty_row()
        };
        let record = StaffRecord::from(row);
        assert_eq!(record.role.map(|r| r.kind()), Some(RoleKind::Manager));
    }

    #[test]
    fn test_no_role_row() {
        assert_eq!(StaffRecord::from(empty_row()).role, None);
    }
}
