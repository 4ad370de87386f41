//! Menu operations. Each prompts for its fields, calls one workflow or
//! report, and prints the outcome.

use std::io::Write;
use std::str::FromStr;

use tokio::io::AsyncBufRead;

use super::Console;
use crate::db::models::{
    MembershipStatus, PaymentStatus, PlanOffer, PlanType, RoleKind, StaffMember,
};
use crate::error::{AppError, AppResult, ErrorKind};
use crate::reports::{cell, money, Table};
use crate::validation;
use crate::workflow::{
    MemberField, PlanTypeChoice, PurchaseRequest, RegisterMemberRequest, RegisterStaffRequest,
    RoleRequest, TransferRequest, UpdateOutcome,
};

fn menu_choice(max: u32) -> impl Fn(&str) -> AppResult<u32> {
    move |s| match s.parse::<u32>() {
        Ok(n) if n >= 1 && n <= max => Ok(n),
        _ => Err(AppError::Validation("Invalid choice.".to_string())),
    }
}

fn plan_table(plans: &[PlanOffer]) -> Table {
    let mut table = Table::new("Available Plans", &["Plan ID", "Plan Type", "Price"])
        .when_empty("No plans available. Use option 17 to set up default plans.");
    for p in plans {
        table.push(vec![cell(p.plan_id), cell(&p.plan_type), cell(money(p.price))]);
    }
    table
}

fn desk_staff_table(staff: &[StaffMember]) -> Table {
    let mut table = Table::new("Desk Staff", &["Staff ID", "First Name", "Last Name"])
        .when_empty("No desk staff available to process payments.");
    for s in staff {
        table.push(vec![cell(s.staff_id), cell(&s.first_name), cell(&s.last_name)]);
    }
    table
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub(super) async fn view_staff(&mut self) -> AppResult<()> {
        self.say("\n=== Staff Members Menu ===")?;
        self.say("1. View All Staff Members")?;
        self.say("2. View Desk Staff Only")?;
        self.say("3. View Trainers Only")?;
        self.say("4. View Managers Only")?;
        self.say("0. Back to Main Menu")?;

        let role = match self.prompt("Enter your choice: ").await?.as_str() {
            "1" => None,
            "2" => Some(RoleKind::Desk),
            "3" => Some(RoleKind::Trainer),
            "4" => Some(RoleKind::Manager),
            "0" => return Ok(()),
            _ => return self.say("Invalid input."),
        };
        let table = self.reports.staff(role).await?;
        self.show(&table)
    }

    pub(super) async fn view_payment_history(&mut self) -> AppResult<()> {
        let member_id = self.ask_id("Enter member ID: ", "member ID").await?;
        let table = self.reports.payment_history(member_id).await?;
        self.show(&table)
    }

    pub(super) async fn view_total_revenue(&mut self) -> AppResult<()> {
        let status = self
            .ask(
                "Filter by payment status (Success/Pending/Failed/Refunded) or press Enter for all: ",
                |s| {
                    if s.is_empty() {
                        return Ok(None);
                    }
                    PaymentStatus::from_str(s).map(Some).map_err(|_| {
                        AppError::Validation(
                            "Invalid status. Must be Success, Pending, Failed, or Refunded."
                                .to_string(),
                        )
                    })
                },
            )
            .await?;
        let total = self.reports.total_revenue(status).await?;
        match status {
            Some(status) => self.say(format!("\nTotal Revenue ({}): {}", status, money(total))),
            None => self.say(format!("\nTotal Revenue: {}", money(total))),
        }
    }

    pub(super) async fn register_member(&mut self) -> AppResult<()> {
        self.say("\n=== Add New Gym Member ===")?;
        let first_name = self
            .ask_checked("First name: ", |s| validation::require_name("First name", s))
            .await?;
        let last_name = self
            .ask_checked("Last name: ", |s| validation::require_name("Last name", s))
            .await?;
        let birthday = self
            .ask_checked("Birthday (YYYY-MM-DD): ", |s| {
                validation::require_date("Birthday", s)
            })
            .await?;
        validation::require_birthday(&birthday, self.workflows.today())?;
        let phone_number = self
            .ask_checked(
                "Phone number (optional, press Enter to skip): ",
                validation::optional_phone,
            )
            .await?;
        let email = self
            .ask_checked(
                "Email (optional, press Enter to skip): ",
                validation::optional_email,
            )
            .await?;

        let member = self
            .workflows
            .register_member(RegisterMemberRequest {
                first_name,
                last_name,
                birthday,
                phone_number,
                email,
            })
            .await?;
        self.say("\n✓ Success! Gym member added.")?;
        self.say(format!("  Member ID: {}", member.member_id))?;
        self.say(format!("  Date joined: {}", member.date_joined))
    }

    pub(super) async fn purchase_membership(&mut self) -> AppResult<()> {
        self.say("\n=== Purchase Membership ===")?;
        let member_id = self.ask_id("Enter member ID: ", "member ID").await?;
        let member = self.workflows.purchase_eligibility(member_id).await?;
        self.say(format!(
            "Member: {} {}",
            member.first_name, member.last_name
        ))?;

        let plans = self.workflows.list_plans().await?;
        self.show(&plan_table(&plans))?;
        if plans.is_empty() {
            return Ok(());
        }
        let plan_id = self.ask_listed_plan("Enter plan ID: ", &plans).await?;

        let today = self.workflows.today();
        let start_date = self
            .ask_checked("Start date (YYYY-MM-DD, press Enter for today): ", |s| {
                validation::date_or_default(Some(s), today)
            })
            .await?;

        let staff_id = match self.ask_desk_staff().await? {
            Some(staff_id) => staff_id,
            None => return Ok(()),
        };
        let payment_type = self
            .ask_checked(
                "Payment type (CASH/CARD/ONLINE): ",
                validation::require_payment_type,
            )
            .await?;

        let outcome = self
            .workflows
            .purchase_membership(PurchaseRequest {
                member_id,
                plan_id,
                start_date: Some(start_date),
                staff_id,
                payment_type,
            })
            .await;
        let Some(receipt) = self.committed_or_rolled_back(outcome)? else {
            return Ok(());
        };

        self.say("\n✓ Success! Membership purchased. Transaction committed.")?;
        self.say(format!(
            "  Membership ID: {}",
            receipt.membership.membership_id
        ))?;
        self.say(format!(
            "  Plan: {} ({})",
            receipt.plan.plan_type,
            money(receipt.plan.price)
        ))?;
        self.say(format!(
            "  Valid: {} to {}",
            receipt.membership.start_date, receipt.membership.end_date
        ))?;
        self.say(format!("  Payment ID: {}", receipt.payment.payment_id))
    }

    pub(super) async fn register_staff_member(&mut self) -> AppResult<()> {
        self.say("\n=== Insert Staff Member ===")?;
        let first_name = self
            .ask_checked("First name: ", |s| validation::require_name("First name", s))
            .await?;
        let last_name = self
            .ask_checked("Last name: ", |s| validation::require_name("Last name", s))
            .await?;
        let phone_number = self
            .ask_checked(
                "Phone number (optional, press Enter to skip): ",
                validation::optional_phone,
            )
            .await?;
        let email = self
            .ask_checked(
                "Email (optional, press Enter to skip): ",
                validation::optional_email,
            )
            .await?;
        let hire_date = self
            .ask_checked("Hire date (YYYY-MM-DD): ", |s| {
                validation::require_date("Hire date", s)
            })
            .await?;
        let salary = self
            .ask_checked("Salary: ", validation::require_salary)
            .await?;

        self.say("\nSelect role:")?;
        self.say("1. Desk Staff")?;
        self.say("2. Trainer")?;
        self.say("3. Manager")?;
        let role = match self.ask("Enter your choice: ", menu_choice(3)).await? {
            1 => self.ask_desk_role().await?,
            2 => self.ask_trainer_role().await?,
            _ => self.ask_manager_role().await?,
        };

        let outcome = self
            .workflows
            .register_staff_member(RegisterStaffRequest {
                first_name,
                last_name,
                phone_number,
                email,
                hire_date,
                salary,
                role,
            })
            .await;
        let Some(record) = self.committed_or_rolled_back(outcome)? else {
            return Ok(());
        };

        self.say("\n✓ Success! Staff member added.")?;
        self.say(format!("  Staff ID: {}", record.staff.staff_id))?;
        if let Some(role) = &record.role {
            self.say(format!("  Role: {}", role.kind()))?;
        }
        Ok(())
    }

    async fn ask_desk_role(&mut self) -> AppResult<RoleRequest> {
        let schedule = self.ask_schedule().await?;
        let desk_location = self
            .ask_checked("Desk location: ", |s| {
                validation::require_text("Desk location", s)
            })
            .await?;
        let responsibility = self
            .ask_checked("Responsibility: ", |s| {
                validation::require_text("Responsibility", s)
            })
            .await?;
        Ok(RoleRequest::Desk {
            schedule,
            desk_location,
            responsibility,
        })
    }

    async fn ask_trainer_role(&mut self) -> AppResult<RoleRequest> {
        let specialty = self.prompt("Specialty (optional, press Enter to skip): ").await?;
        let schedule = self.ask_schedule().await?;
        let certification_level = self
            .ask_checked("Certification level: ", |s| {
                validation::require_text("Certification level", s)
            })
            .await?;
        let experience = self
            .ask_checked("Experience (years): ", validation::require_experience)
            .await?;
        Ok(RoleRequest::Trainer {
            specialty,
            schedule,
            certification_level,
            experience,
        })
    }

    async fn ask_manager_role(&mut self) -> AppResult<RoleRequest> {
        let department = self
            .ask_checked("Department: ", |s| validation::require_text("Department", s))
            .await?;
        let office_location = self
            .ask_checked("Office location: ", |s| {
                validation::require_text("Office location", s)
            })
            .await?;
        let experience = self
            .ask_checked(
                "Experience (years, optional, press Enter to skip): ",
                validation::optional_experience,
            )
            .await?;
        Ok(RoleRequest::Manager {
            department,
            office_location,
            experience,
        })
    }

    async fn ask_schedule(&mut self) -> AppResult<String> {
        self.ask_checked(
            "Schedule (e.g. Mon-Fri 9AM-5PM or Mon- 9AM-5PM): ",
            validation::require_schedule,
        )
        .await
    }

    pub(super) async fn add_plan(&mut self) -> AppResult<()> {
        self.say("\n=== Insert New Plan ===")?;
        let types = self.workflows.list_plan_types().await?;
        if types.is_empty() {
            self.say("No plan types exist in the database.")?;
            if !self
                .confirm("Would you like to create a plan type first? (y/n): ")
                .await?
            {
                return Ok(());
            }
            if !self.create_plan_type(None).await? {
                return Ok(());
            }
        } else {
            let mut table = Table::new("Plan Types", &["Plan Type", "Price"]);
            for t in &types {
                table.push(vec![cell(&t.plan_type), cell(money(t.price))]);
            }
            self.show(&table)?;
        }

        let Some(plan_type) = self
            .ask_plan_type("Select plan type to create a new plan:")
            .await?
        else {
            return self.say("Cancelled.");
        };

        let plan = match self.workflows.add_plan(plan_type).await {
            Err(e) if e.kind() == ErrorKind::Precondition => {
                self.say(e.operator_message())?;
                if !self
                    .confirm("Would you like to create this plan type first? (y/n): ")
                    .await?
                    || !self.create_plan_type(Some(plan_type)).await?
                {
                    return Ok(());
                }
                self.workflows.add_plan(plan_type).await?
            }
            other => other?,
        };

        self.say("\n✓ Success! New plan created.")?;
        self.say(format!("  Plan ID: {}", plan.plan_id))?;
        self.say(format!("  Plan Type: {}", plan.plan_type))
    }

    /// Insert a plan type, asking for the type when not given.
    /// `false` when the operator cancels.
    async fn create_plan_type(&mut self, plan_type: Option<PlanType>) -> AppResult<bool> {
        let plan_type = match plan_type {
            Some(plan_type) => plan_type,
            None => match self.ask_plan_type("Select plan type to add:").await? {
                Some(plan_type) => plan_type,
                None => {
                    self.say("Cancelled.")?;
                    return Ok(false);
                }
            },
        };
        let price = self
            .ask_checked(
                &format!("Enter price for {} plan (e.g., 29.99): $", plan_type),
                validation::require_price,
            )
            .await?;
        let info = self.workflows.add_plan_type(plan_type, &price).await?;

        self.say("\n✓ Success! Plan type created.")?;
        self.say(format!("  Plan Type: {}", info.plan_type))?;
        self.say(format!("  Price: {}", money(info.price)))?;
        Ok(true)
    }

    async fn ask_plan_type(&mut self, heading: &str) -> AppResult<Option<PlanType>> {
        self.say(format!("\n{}", heading))?;
        for (i, plan_type) in PlanType::ALL.iter().enumerate() {
            self.say(format!("{}. {}", i + 1, plan_type))?;
        }
        self.say("0. Cancel")?;
        let choice = self.ask("Enter your choice: ", PlanTypeChoice::parse).await?;
        Ok(match choice {
            PlanTypeChoice::Cancel => None,
            PlanTypeChoice::Type(plan_type) => Some(plan_type),
        })
    }

    pub(super) async fn setup_default_plans(&mut self) -> AppResult<()> {
        self.say("\n=== Setup Default Plans ===")?;
        self.say("This will create the default plan types and plans for the gym.")?;
        self.say("Default plan types:")?;
        for plan_type in PlanType::ALL {
            self.say(format!(
                "  - {}: {}",
                plan_type,
                money(plan_type.default_price())
            ))?;
        }
        if !self.confirm("Do you want to proceed? (y/n): ").await? {
            return self.say("Setup cancelled.");
        }

        let outcome = self.workflows.setup_default_plans().await;
        let Some(receipt) = self.committed_or_rolled_back(outcome)? else {
            return Ok(());
        };
        self.say("\n✓ Success! Default plans have been set up.")?;
        self.say(format!(
            "  Created {} plan types and {} plans.",
            receipt.created_types.len(),
            receipt.plans.len()
        ))
    }

    pub(super) async fn update_member(&mut self) -> AppResult<()> {
        self.say("\n=== Update Gym Member ===")?;
        let member_id = self.ask_id("Enter member ID to update: ", "member ID").await?;
        self.say("Select field to update:")?;
        self.say("1. First Name")?;
        self.say("2. Last Name")?;
        self.say("3. Phone Number")?;
        self.say("4. Email")?;
        let (field, label, text) = match self.ask("Enter your choice: ", menu_choice(4)).await? {
            1 => (MemberField::FirstName, "First name", "New first name: "),
            2 => (MemberField::LastName, "Last name", "New last name: "),
            3 => (
                MemberField::PhoneNumber,
                "Phone number",
                "New phone number (press Enter to clear): ",
            ),
            _ => (
                MemberField::Email,
                "Email",
                "New email (press Enter to clear): ",
            ),
        };
        let value = self.ask_checked(text, |s| field.parse(s)).await?;

        match self
            .workflows
            .update_member(member_id, field, &value)
            .await?
        {
            UpdateOutcome::Updated { .. } => {
                self.say(format!("\n✓ Success! {} updated.", label))
            }
            UpdateOutcome::Unchanged(_) => {
                self.say("No changes made. The new value is the same as the current value.")
            }
        }
    }

    pub(super) async fn update_membership_status(&mut self) -> AppResult<()> {
        self.say("\n=== Update Membership Status ===")?;
        let member_id = self.ask_id("Enter member ID: ", "member ID").await?;
        self.say("Select new status:")?;
        for (i, status) in MembershipStatus::ALL.iter().enumerate() {
            self.say(format!("{}. {}", i + 1, status))?;
        }
        let choice = self.ask("Enter your choice: ", menu_choice(3)).await?;
        let status = MembershipStatus::ALL[choice as usize - 1];

        match self
            .workflows
            .update_membership_status(member_id, status)
            .await?
        {
            UpdateOutcome::Updated { before, after } => self.say(format!(
                "\n✓ Success! Membership status updated from {} to {}.",
                before, after
            )),
            UpdateOutcome::Unchanged(status) => self.say(format!(
                "Membership is already {}. No changes made.",
                status
            )),
        }
    }

    pub(super) async fn update_staff_salary(&mut self) -> AppResult<()> {
        self.say("\n=== Update Staff Salary ===")?;
        let staff_id = self.ask_id("Enter staff ID: ", "staff ID").await?;
        let salary = self
            .ask_checked("New salary: ", validation::require_salary)
            .await?;

        match self
            .workflows
            .update_staff_salary(staff_id, &salary)
            .await?
        {
            UpdateOutcome::Updated { before, after } => self.say(format!(
                "\n✓ Success! Salary updated from {} to {}.",
                money(before),
                money(after)
            )),
            UpdateOutcome::Unchanged(_) => {
                self.say("No changes made. The new salary is the same as the current salary.")
            }
        }
    }

    pub(super) async fn update_payment_status(&mut self) -> AppResult<()> {
        self.say("\n=== Update Payment Status ===")?;
        let payment_id = self.ask_id("Enter payment ID: ", "payment ID").await?;
        self.say("Select new status:")?;
        for (i, status) in PaymentStatus::ALL.iter().enumerate() {
            self.say(format!("{}. {}", i + 1, status))?;
        }
        let choice = self.ask("Enter your choice: ", menu_choice(4)).await?;
        let status = PaymentStatus::ALL[choice as usize - 1];

        match self
            .workflows
            .update_payment_status(payment_id, status)
            .await?
        {
            UpdateOutcome::Updated { before, after } => self.say(format!(
                "\n✓ Success! Payment status updated from {} to {}.",
                before, after
            )),
            UpdateOutcome::Unchanged(status) => {
                self.say(format!("Payment is already {}. No changes made.", status))
            }
        }
    }

    pub(super) async fn delete_member(&mut self) -> AppResult<()> {
        self.say("\n=== Delete Gym Member ===")?;
        let member_id = self
            .ask_id("Enter member ID to delete: ", "member ID")
            .await?;
        let question = format!(
            "Delete member {} and all of their memberships and payments? (y/n): ",
            member_id
        );
        if !self.confirm(&question).await? {
            return self.say("Deletion cancelled.");
        }
        self.workflows.delete_member(member_id).await?;
        self.say("\n✓ Success! Member deleted.")
    }

    pub(super) async fn transfer_membership(&mut self) -> AppResult<()> {
        self.say("\n=== Transfer Membership Plan ===")?;
        let active = self.reports.active_memberships().await?;
        self.show(&active)?;
        if active.is_empty() {
            return Ok(());
        }
        let membership_id = self
            .ask_id("Enter membership ID to transfer: ", "membership ID")
            .await?;

        let plans = self.workflows.list_plans().await?;
        self.show(&plan_table(&plans))?;
        if plans.is_empty() {
            return Ok(());
        }
        let new_plan_id = self.ask_listed_plan("Enter new plan ID: ", &plans).await?;

        let staff_id = match self.ask_desk_staff().await? {
            Some(staff_id) => staff_id,
            None => return Ok(()),
        };
        let payment_type = self
            .ask_checked(
                "Payment type (CASH/CARD/ONLINE): ",
                validation::require_payment_type,
            )
            .await?;

        let outcome = self
            .workflows
            .transfer_membership(TransferRequest {
                membership_id,
                new_plan_id,
                staff_id,
                payment_type,
            })
            .await;
        let Some(receipt) = self.committed_or_rolled_back(outcome)? else {
            return Ok(());
        };

        self.say("\n✓ Success! Membership plan transferred. Transaction committed.")?;
        self.say(format!(
            "  New plan: {} ({})",
            receipt.plan.plan_type,
            money(receipt.plan.price)
        ))?;
        self.say(format!(
            "  Valid: {} to {}",
            receipt.membership.start_date, receipt.membership.end_date
        ))?;
        self.say(format!("  Payment ID: {}", receipt.payment.payment_id))
    }

    /// Plan ID that appears in `plans`.
    async fn ask_listed_plan(&mut self, text: &str, plans: &[PlanOffer]) -> AppResult<i32> {
        self.ask(text, |s| {
            let id = s
                .parse::<i32>()
                .map_err(|_| AppError::Validation("Invalid plan ID format.".to_string()))?;
            if !plans.iter().any(|p| p.plan_id == id) {
                return Err(AppError::Validation(format!(
                    "Plan ID {} does not exist.",
                    id
                )));
            }
            Ok(id)
        })
        .await
    }

    /// Show desk staff and read the processor's ID. `None` when there is none.
    async fn ask_desk_staff(&mut self) -> AppResult<Option<i32>> {
        let staff = self.workflows.desk_staff().await?;
        self.show(&desk_staff_table(&staff))?;
        if staff.is_empty() {
            return Ok(None);
        }
        let staff_id = self
            .ask("Enter staff ID processing the payment: ", |s| {
                let id = s
                    .parse::<i32>()
                    .map_err(|_| AppError::Validation("Invalid staff ID format.".to_string()))?;
                if !staff.iter().any(|m| m.staff_id == id) {
                    return Err(AppError::Validation(format!(
                        "Staff ID {} is not a desk staff member.",
                        id
                    )));
                }
                Ok(id)
            })
            .await?;
        Ok(Some(staff_id))
    }

    /// Report a failed transactional workflow together with its rollback.
    /// `None` when it failed.
    fn committed_or_rolled_back<T>(&mut self, outcome: AppResult<T>) -> AppResult<Option<T>> {
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.say(format!("\n{}", e.operator_message()))?;
                self.say("Transaction rolled back. No changes were made.")?;
                Ok(None)
            }
        }
    }
}
