//! Interactive console: the numbered menu and its prompts.
//!
//! The console reads operator lines from any [`AsyncBufRead`] and writes to
//! any [`Write`], so it runs the same over stdin/stdout and over scripted
//! input in tests. Workflow and report errors are printed and the loop goes
//! on; only end of input or an output failure ends the session.

mod operations;

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::reports::{ReportingService, Table};
use crate::validation;
use crate::workflow::Workflows;

const MENU: &str = "\
=====================================
 Gym Database Management System Menu
=====================================
Note: How the terminal is zoomed can affect the output of the table columns, so please zoom out to see the full output.
Enter the number of the option you want to select:

-------------------------------------
View/Selection Options:
1. View Gym Members
2. View All Memberships
3. View Staff Members
4. View Plans
5. View Payments
6. View Check-Ins
7. View Active Members (Uses a view created in the database)
8. View Trainer Trains Member
9. View Guest Members
10. View Guest Visits
11. View Member Payment History (Stored Procedure)
12. Calculate Total Revenue (Stored Function)
-------------------------------------
Insertion Options:
13. Add new Gym Member
14. Purchase Membership (Transaction Demo)
15. Insert Staff Member
16. Add New Plan
17. Setup Default Plans (Quick Setup)
-------------------------------------
Update Options:
18. Update Gym Member
19. Update Membership Status
20. Update Staff Salary
21. Update Payment Status
-------------------------------------
Deletion Options:
22. Delete Gym Member
-------------------------------------
Transaction Demo:
23. Transfer Membership Plan (COMMIT/ROLLBACK Demo)

0. Exit
=====================================";

pub struct Console<R, W> {
    input: R,
    output: W,
    workflows: Workflows,
    reports: ReportingService,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W, workflows: Workflows, reports: ReportingService) -> Self {
        Self {
            input,
            output,
            workflows,
            reports,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Menu loop. Returns when the operator picks 0 or input ends.
    pub async fn run(&mut self) -> AppResult<()> {
        writeln!(
            self.output,
            "Welcome to the Gym Database Management System!"
        )?;

        loop {
            writeln!(self.output, "{}", MENU)?;
            let choice = match self.prompt("Enter your choice: ").await {
                Ok(choice) => choice,
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            };
            let choice = choice.parse::<u32>().ok();
            if choice == Some(0) {
                break;
            }

            debug!(choice = ?choice, "Menu option selected");
            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => writeln!(self.output, "\n{}", e.operator_message())?,
            }

            writeln!(self.output, "\nPress Enter to continue...")?;
            match self.read_line().await {
                Ok(_) => {}
                Err(e) if is_end_of_input(&e) => break,
                Err(e) => return Err(e),
            }
        }

        writeln!(self.output, "Exiting...")?;
        self.output.flush()?;
        Ok(())
    }

    async fn dispatch(&mut self, choice: Option<u32>) -> AppResult<()> {
        let table = match choice {
            Some(1) => self.reports.members().await?,
            Some(2) => self.reports.memberships().await?,
            Some(4) => self.reports.plans().await?,
            Some(5) => self.reports.payments().await?,
            Some(6) => self.reports.check_ins().await?,
            Some(7) => self.reports.active_members().await?,
            Some(8) => self.reports.trainer_assignments().await?,
            Some(9) => self.reports.guests().await?,
            Some(10) => self.reports.guest_visits().await?,
            Some(3) => return self.view_staff().await,
            Some(11) => return self.view_payment_history().await,
            Some(12) => return self.view_total_revenue().await,
            Some(13) => return self.register_member().await,
            Some(14) => return self.purchase_membership().await,
            Some(15) => return self.register_staff_member().await,
            Some(16) => return self.add_plan().await,
            Some(17) => return self.setup_default_plans().await,
            Some(18) => return self.update_member().await,
            Some(19) => return self.update_membership_status().await,
            Some(20) => return self.update_staff_salary().await,
            Some(21) => return self.update_payment_status().await,
            Some(22) => return self.delete_member().await,
            Some(23) => return self.transfer_membership().await,
            _ => return self.say("Invalid input."),
        };
        self.show(&table)
    }

    fn show(&mut self, table: &Table) -> AppResult<()> {
        write!(self.output, "{}", table.render())?;
        Ok(())
    }

    fn say(&mut self, line: impl std::fmt::Display) -> AppResult<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// One line without its terminator. End of input is an error.
    async fn read_line(&mut self) -> AppResult<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(end_of_input());
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Print `text` and read the trimmed answer.
    async fn prompt(&mut self, text: &str) -> AppResult<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        Ok(self.read_line().await?.trim().to_string())
    }

    /// Prompt until `check` accepts the answer, echoing each rejection.
    async fn ask<T>(&mut self, text: &str, check: impl Fn(&str) -> AppResult<T>) -> AppResult<T> {
        loop {
            let answer = self.prompt(text).await?;
            match check(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "{}", e.operator_message())?,
            }
        }
    }

    /// Like [`Console::ask`] but hands back the accepted raw text.
    async fn ask_checked<T>(
        &mut self,
        text: &str,
        check: impl Fn(&str) -> AppResult<T>,
    ) -> AppResult<String> {
        self.ask(text, |s| check(s).map(|_| s.to_string())).await
    }

    /// Positive row ID.
    async fn ask_id(&mut self, text: &str, label: &str) -> AppResult<i32> {
        self.ask(text, |s| {
            let id = s
                .parse::<i32>()
                .map_err(|_| AppError::Validation(format!("Invalid {} format.", label)))?;
            validation::require_id(label, id)
        })
        .await
    }

    async fn confirm(&mut self, text: &str) -> AppResult<bool> {
        let answer = self.prompt(text).await?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

fn end_of_input() -> AppError {
    AppError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"))
}

fn is_end_of_input(e: &AppError) -> bool {
    matches!(e, AppError::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof)
}
