//! Entity repository seam.
//!
//! Workflows never touch a connection directly. They open a [`UnitOfWork`]
//! through a [`Store`], issue one repository call per logical operation and
//! then commit or roll back. Reporting goes through [`ReportSource`] and
//! never opens a transaction.
//!
//! Every call returns an [`AppResult`]. Uniqueness and referential failures
//! come back as [`AppError::Constraint`](crate::error::AppError::Constraint)
//! so the workflow layer can say which field collided.

mod memory;
mod postgres;

pub use memory::{FailPoint, MemoryStore, Tables};
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::db::models::{
    CheckIn, GuestVisit, Guest, GymMember, MemberChange, Membership, MembershipRow,
    MembershipStatus, NewGymMember, NewMembership, NewPayment, NewStaffMember, Payment,
    PaymentHistoryRow, PaymentStatus, PlanOffer, PlanType, PlanTypeInfo, Role, RoleKind,
    StaffMember, StaffRecord, TrainerAssignment,
};
use crate::error::AppResult;

/// Opens units of work.
#[async_trait]
pub trait Store: Send + Sync {
    /// Begin a transaction. Nothing written through the returned unit of
    /// work is visible to anyone else until [`UnitOfWork::commit`].
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

/// Per-entity operations inside one transaction.
///
/// Dropping a unit of work without committing discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    // Members

    async fn find_member(&mut self, member_id: i32) -> AppResult<Option<GymMember>>;

    async fn member_exists(&mut self, member_id: i32) -> AppResult<bool>;

    async fn insert_member(&mut self, member: &NewGymMember) -> AppResult<GymMember>;

    async fn update_member(&mut self, member_id: i32, change: &MemberChange) -> AppResult<u64>;

    async fn delete_member(&mut self, member_id: i32) -> AppResult<u64>;

    // Memberships

    async fn find_membership(&mut self, membership_id: i32) -> AppResult<Option<Membership>>;

    /// The member's membership with the highest ID.
    async fn latest_membership(&mut self, member_id: i32) -> AppResult<Option<Membership>>;

    async fn has_active_membership(&mut self, member_id: i32) -> AppResult<bool>;

    /// Insert with status `Active`.
    async fn insert_membership(&mut self, membership: &NewMembership) -> AppResult<Membership>;

    async fn update_membership_plan(
        &mut self,
        membership_id: i32,
        plan_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<u64>;

    async fn update_membership_status(
        &mut self,
        membership_id: i32,
        status: MembershipStatus,
    ) -> AppResult<u64>;

    // Plans

    async fn list_plans(&mut self) -> AppResult<Vec<PlanOffer>>;

    async fn find_plan(&mut self, plan_id: i32) -> AppResult<Option<PlanOffer>>;

    async fn list_plan_types(&mut self) -> AppResult<Vec<PlanTypeInfo>>;

    async fn find_plan_type(&mut self, plan_type: PlanType) -> AppResult<Option<PlanTypeInfo>>;

    async fn insert_plan_type(
        &mut self,
        plan_type: PlanType,
        price: Decimal,
    ) -> AppResult<PlanTypeInfo>;

    async fn insert_plan(&mut self, plan_type: PlanType) -> AppResult<PlanOffer>;

    // Staff

    async fn find_staff(&mut self, staff_id: i32) -> AppResult<Option<StaffMember>>;

    async fn insert_staff(&mut self, staff: &NewStaffMember) -> AppResult<StaffMember>;

    /// Insert the single role row for a staff member.
    async fn insert_role(&mut self, staff_id: i32, role: &Role) -> AppResult<()>;

    async fn is_desk_staff(&mut self, staff_id: i32) -> AppResult<bool>;

    async fn list_desk_staff(&mut self) -> AppResult<Vec<StaffMember>>;

    async fn update_staff_salary(&mut self, staff_id: i32, salary: Decimal) -> AppResult<u64>;

    // Payments

    async fn find_payment(&mut self, payment_id: i32) -> AppResult<Option<Payment>>;

    /// Insert with status `Success`.
    async fn insert_payment(&mut self, payment: &NewPayment) -> AppResult<Payment>;

    async fn update_payment_status(
        &mut self,
        payment_id: i32,
        status: PaymentStatus,
    ) -> AppResult<u64>;

    // Transaction boundary

    async fn commit(self: Box<Self>) -> AppResult<()>;

    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Read-only queries behind the reports. Rows come back ordered by primary key.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn members(&self) -> AppResult<Vec<GymMember>>;

    async fn memberships(&self) -> AppResult<Vec<MembershipRow>>;

    /// All staff, or only those holding `role`.
    async fn staff(&self, role: Option<RoleKind>) -> AppResult<Vec<StaffRecord>>;

    async fn plans(&self) -> AppResult<Vec<PlanOffer>>;

    async fn payments(&self) -> AppResult<Vec<Payment>>;

    async fn check_ins(&self) -> AppResult<Vec<CheckIn>>;

    /// Members holding an Active membership.
    async fn active_members(&self) -> AppResult<Vec<GymMember>>;

    async fn trainer_assignments(&self) -> AppResult<Vec<TrainerAssignment>>;

    async fn guests(&self) -> AppResult<Vec<Guest>>;

    async fn guest_visits(&self) -> AppResult<Vec<GuestVisit>>;

    /// Payments of one member, oldest first.
    async fn payment_history(&self, member_id: i32) -> AppResult<Vec<PaymentHistoryRow>>;

    /// Sum of payment amounts, restricted to one status when given.
    async fn total_revenue(&self, status: Option<PaymentStatus>) -> AppResult<Decimal>;
}
