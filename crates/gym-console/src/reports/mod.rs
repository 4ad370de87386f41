//! Read-only reports.
//!
//! Each report pulls rows from a [`ReportSource`] and lays them out as a
//! [`Table`], ordered by primary key unless noted.

mod table;

pub use table::{cell, money, opt, Table, NO_VALUE};

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::db::models::{MembershipStatus, PaymentStatus, Role, RoleKind};
use crate::error::AppResult;
use crate::store::ReportSource;

const MEMBER_HEADERS: [&str; 7] = [
    "Member ID",
    "First Name",
    "Last Name",
    "Birthday",
    "Phone Number",
    "Email",
    "Date Joined",
];

const MEMBERSHIP_HEADERS: [&str; 9] = [
    "Membership ID",
    "Member ID",
    "First Name",
    "Last Name",
    "Status",
    "Plan Type",
    "Price",
    "Start Date",
    "End Date",
];

const STAFF_HEADERS: [&str; 7] = [
    "Staff ID",
    "First Name",
    "Last Name",
    "Phone Number",
    "Email",
    "Hire Date",
    "Salary",
];

#[derive(Clone)]
pub struct ReportingService {
    source: Arc<dyn ReportSource>,
}

impl ReportingService {
    pub fn new(source: Arc<dyn ReportSource>) -> Self {
        Self { source }
    }

    pub async fn members(&self) -> AppResult<Table> {
        let mut table = Table::new("Gym Members", &MEMBER_HEADERS)
            .describe("This table shows all the gym members and their details.")
            .when_empty("No gym members in the database");
        for m in self.source.members().await? {
            table.push(vec![
                cell(m.member_id),
                cell(m.first_name),
                cell(m.last_name),
                cell(m.birthday),
                m.phone_number,
                m.email,
                cell(m.date_joined),
            ]);
        }
        Ok(table)
    }

    pub async fn memberships(&self) -> AppResult<Table> {
        let table = Table::new("All Memberships", &MEMBERSHIP_HEADERS)
            .describe("This table shows all the memberships with their member and plan.")
            .when_empty("No memberships in the database");
        self.membership_rows(table, None).await
    }

    /// Memberships currently Active; the pick list for plan transfers.
    pub async fn active_memberships(&self) -> AppResult<Table> {
        let table = Table::new("Active Memberships", &MEMBERSHIP_HEADERS)
            .when_empty("No active memberships found.");
        self.membership_rows(table, Some(MembershipStatus::Active))
            .await
    }

    async fn membership_rows(
        &self,
        mut table: Table,
        status: Option<MembershipStatus>,
    ) -> AppResult<Table> {
        for m in self.source.memberships().await? {
            if status.is_some_and(|s| s.as_str() != m.status) {
                continue;
            }
            table.push(vec![
                cell(m.membership_id),
                cell(m.member_id),
                m.first_name,
                m.last_name,
                cell(m.status),
                m.plan_type,
                m.price.map(money),
                cell(m.start_date),
                cell(m.end_date),
            ]);
        }
        Ok(table)
    }

    /// All staff, or only those holding `role`. Role filters add the
    /// role's own columns.
    pub async fn staff(&self, role: Option<RoleKind>) -> AppResult<Table> {
        let (title, extra): (&str, &[&'static str]) = match role {
            None => ("All Staff Members", &["Role"]),
            Some(RoleKind::Desk) => (
                "Desk Staff",
                &["Schedule", "Desk Location", "Responsibility"],
            ),
            Some(RoleKind::Trainer) => (
                "Trainers",
                &["Specialty", "Schedule", "Certification Level", "Experience"],
            ),
            Some(RoleKind::Manager) => {
                ("Managers", &["Department", "Office Location", "Experience"])
            }
        };
        let headers: Vec<&'static str> = STAFF_HEADERS.iter().chain(extra).copied().collect();
        let mut table = Table::new(title, &headers)
            .when_empty(format!("No {} in the database", title.to_lowercase()));

        for record in self.source.staff(role).await? {
            let s = record.staff;
            let mut row = vec![
                cell(s.staff_id),
                cell(s.first_name),
                cell(s.last_name),
                s.phone_number,
                s.email,
                cell(s.hire_date),
                cell(money(s.salary)),
            ];
            match (role, record.role) {
                (None, r) => row.push(opt(r.as_ref().map(Role::kind))),
                (Some(_), Some(Role::Desk(d))) => {
                    row.extend([cell(d.schedule), cell(d.desk_location), cell(d.responsibility)])
                }
                (Some(_), Some(Role::Trainer(t))) => row.extend([
                    t.specialty,
                    cell(t.schedule),
                    cell(t.certification_level),
                    cell(t.experience),
                ]),
                (Some(_), Some(Role::Manager(m))) => row.extend([
                    cell(m.department),
                    cell(m.office_location),
                    opt(m.experience),
                ]),
                (Some(_), None) => row.extend(extra.iter().map(|_| None)),
            }
            table.push(row);
        }
        Ok(table)
    }

    pub async fn plans(&self) -> AppResult<Table> {
        let mut table = Table::new("Plans", &["Plan ID", "Plan Type", "Price"])
            .describe("This table shows all the plans and their details.")
            .when_empty("No plans in the database");
        for p in self.source.plans().await? {
            table.push(vec![cell(p.plan_id), cell(p.plan_type), cell(money(p.price))]);
        }
        Ok(table)
    }

    pub async fn payments(&self) -> AppResult<Table> {
        let mut table = Table::new(
            "Payments",
            &[
                "Payment ID",
                "Staff ID",
                "Member ID",
                "Amount",
                "Payment Type",
                "Date of Payment",
                "Status",
            ],
        )
        .when_empty("No payments in the database");
        for p in self.source.payments().await? {
            table.push(vec![
                cell(p.payment_id),
                cell(p.staff_id),
                cell(p.member_id),
                cell(money(p.amount)),
                cell(p.payment_type),
                cell(p.date_of_payment),
                cell(p.status),
            ]);
        }
        Ok(table)
    }

    pub async fn check_ins(&self) -> AppResult<Table> {
        let mut table = Table::new(
            "Check-Ins",
            &["Check-In ID", "Membership ID", "Staff ID", "Timestamp", "Location"],
        )
        .when_empty("No check-ins in the database");
        for c in self.source.check_ins().await? {
            table.push(vec![
                cell(c.check_in_id),
                cell(c.membership_id),
                opt(c.staff_id),
                cell(c.ts.format("%Y-%m-%d %H:%M:%S")),
                c.location,
            ]);
        }
        Ok(table)
    }

    /// Members with an Active membership, from the `active_members` view.
    pub async fn active_members(&self) -> AppResult<Table> {
        let mut table = Table::new("Active Members", &MEMBER_HEADERS)
            .describe("Members with an Active membership.")
            .when_empty("No active members");
        for m in self.source.active_members().await? {
            table.push(vec![
                cell(m.member_id),
                cell(m.first_name),
                cell(m.last_name),
                cell(m.birthday),
                m.phone_number,
                m.email,
                cell(m.date_joined),
            ]);
        }
        Ok(table)
    }

    /// Ordered by trainer, then member.
    pub async fn trainer_assignments(&self) -> AppResult<Table> {
        let mut table = Table::new(
            "Trainer Trains Member",
            &["Trainer ID", "Trainer Name", "Member ID", "Member Name"],
        )
        .when_empty("No trainer assignments in the database");
        for a in self.source.trainer_assignments().await? {
            table.push(vec![
                cell(a.trainer_id),
                cell(format!("{} {}", a.trainer_first_name, a.trainer_last_name)),
                cell(a.member_id),
                cell(format!("{} {}", a.member_first_name, a.member_last_name)),
            ]);
        }
        Ok(table)
    }

    pub async fn guests(&self) -> AppResult<Table> {
        let mut table = Table::new(
            "Guest Members",
            &["Guest ID", "First Name", "Last Name", "Phone Number", "Email"],
        )
        .when_empty("No guests in the database");
        for g in self.source.guests().await? {
            table.push(vec![
                cell(g.guest_id),
                cell(g.first_name),
                cell(g.last_name),
                g.phone_number,
                g.email,
            ]);
        }
        Ok(table)
    }

    pub async fn guest_visits(&self) -> AppResult<Table> {
        let mut table = Table::new(
            "Guest Visits",
            &["Visit ID", "Guest ID", "Guest Name", "Member ID", "Visit Date"],
        )
        .when_empty("No guest visits in the database");
        for v in self.source.guest_visits().await? {
            table.push(vec![
                cell(v.visit_id),
                cell(v.guest_id),
                cell(format!("{} {}", v.guest_first_name, v.guest_last_name)),
                opt(v.member_id),
                cell(v.visit_date),
            ]);
        }
        Ok(table)
    }

    /// Payments of one member, oldest first.
    pub async fn payment_history(&self, member_id: i32) -> AppResult<Table> {
        let mut table = Table::new(
            format!("Payment History for Member {}", member_id),
            &[
                "Payment ID",
                "Date of Payment",
                "Amount",
                "Payment Type",
                "Status",
                "Staff ID",
            ],
        )
        .when_empty(format!("No payments found for member ID {}", member_id));
        for p in self.source.payment_history(member_id).await? {
            table.push(vec![
                cell(p.payment_id),
                cell(p.date_of_payment),
                cell(money(p.amount)),
                cell(p.payment_type),
                cell(p.status),
                cell(p.staff_id),
            ]);
        }
        Ok(table)
    }

    /// Sum of payment amounts, optionally limited to one status.
    pub async fn total_revenue(&self, status: Option<PaymentStatus>) -> AppResult<Decimal> {
        let total = self.source.total_revenue(status).await?;
        debug!(status = ?status, %total, "Total revenue computed");
        Ok(total)
    }
}
