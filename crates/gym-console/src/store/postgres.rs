//! PostgreSQL implementation of the repository seam.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use super::{ReportSource, Store, UnitOfWork};
use crate::db::models::{
    CheckIn, Guest, GuestVisit, GymMember, MemberChange, Membership, MembershipRow,
    MembershipStatus, NewGymMember, NewMembership, NewPayment, NewStaffMember, Payment,
    PaymentHistoryRow, PaymentStatus, PlanOffer, PlanType, PlanTypeInfo, Role, RoleKind,
    StaffMember, StaffRecord, TrainerAssignment,
};
use crate::db::queries::{activity, member, membership, payment, plan, staff};
use crate::db::DbPool;
use crate::error::AppResult;

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One database transaction. Dropped without commit, sqlx rolls it back.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_member(&mut self, member_id: i32) -> AppResult<Option<GymMember>> {
        member::get_member(&mut self.tx, member_id).await
    }

    async fn member_exists(&mut self, member_id: i32) -> AppResult<bool> {
        member::member_exists(&mut self.tx, member_id).await
    }

    async fn insert_member(&mut self, new: &NewGymMember) -> AppResult<GymMember> {
        member::insert_member(&mut self.tx, new).await
    }

    async fn update_member(&mut self, member_id: i32, change: &MemberChange) -> AppResult<u64> {
        member::update_member(&mut self.tx, member_id, change).await
    }

    async fn delete_member(&mut self, member_id: i32) -> AppResult<u64> {
        member::delete_member(&mut self.tx, member_id).await
    }

    async fn find_membership(&mut self, membership_id: i32) -> AppResult<Option<Membership>> {
        membership::get_membership(&mut self.tx, membership_id).await
    }

    async fn latest_membership(&mut self, member_id: i32) -> AppResult<Option<Membership>> {
        membership::get_latest_membership(&mut self.tx, member_id).await
    }

    async fn has_active_membership(&mut self, member_id: i32) -> AppResult<bool> {
        membership::has_active_membership(&mut self.tx, member_id).await
    }

    async fn insert_membership(&mut self, new: &NewMembership) -> AppResult<Membership> {
        membership::insert_membership(&mut self.tx, new).await
    }

    async fn update_membership_plan(
        &mut self,
        membership_id: i32,
        plan_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<u64> {
        membership::update_membership_plan(&mut self.tx, membership_id, plan_id, start_date, end_date)
            .await
    }

    async fn update_membership_status(
        &mut self,
        membership_id: i32,
        status: MembershipStatus,
    ) -> AppResult<u64> {
        membership::update_membership_status(&mut self.tx, membership_id, status).await
    }

    async fn list_plans(&mut self) -> AppResult<Vec<PlanOffer>> {
        plan::list_plans(&mut self.tx).await
    }

    async fn find_plan(&mut self, plan_id: i32) -> AppResult<Option<PlanOffer>> {
        plan::get_plan(&mut self.tx, plan_id).await
    }

    async fn list_plan_types(&mut self) -> AppResult<Vec<PlanTypeInfo>> {
        plan::list_plan_types(&mut self.tx).await
    }

    async fn find_plan_type(&mut self, plan_type: PlanType) -> AppResult<Option<PlanTypeInfo>> {
        plan::get_plan_type(&mut self.tx, plan_type).await
    }

    async fn insert_plan_type(
        &mut self,
        plan_type: PlanType,
        price: Decimal,
    ) -> AppResult<PlanTypeInfo> {
        plan::insert_plan_type(&mut self.tx, plan_type, price).await
    }

    async fn insert_plan(&mut self, plan_type: PlanType) -> AppResult<PlanOffer> {
        plan::insert_plan(&mut self.tx, plan_type).await
    }

    async fn find_staff(&mut self, staff_id: i32) -> AppResult<Option<StaffMember>> {
        staff::get_staff(&mut self.tx, staff_id).await
    }

    async fn insert_staff(&mut self, new: &NewStaffMember) -> AppResult<StaffMember> {
        staff::insert_staff(&mut self.tx, new).await
    }

    async fn insert_role(&mut self, staff_id: i32, role: &Role) -> AppResult<()> {
        staff::insert_role(&mut self.tx, staff_id, role).await
    }

    async fn is_desk_staff(&mut self, staff_id: i32) -> AppResult<bool> {
        staff::is_desk_staff(&mut self.tx, staff_id).await
    }

    async fn list_desk_staff(&mut self) -> AppResult<Vec<StaffMember>> {
        staff::list_desk_staff(&mut self.tx).await
    }

    async fn update_staff_salary(&mut self, staff_id: i32, salary: Decimal) -> AppResult<u64> {
        staff::update_staff_salary(&mut self.tx, staff_id, salary).await
    }

    async fn find_payment(&mut self, payment_id: i32) -> AppResult<Option<Payment>> {
        payment::get_payment(&mut self.tx, payment_id).await
    }

    async fn insert_payment(&mut self, new: &NewPayment) -> AppResult<Payment> {
        payment::insert_payment(&mut self.tx, new).await
    }

    async fn update_payment_status(
        &mut self,
        payment_id: i32,
        status: PaymentStatus,
    ) -> AppResult<u64> {
        payment::update_payment_status(&mut self.tx, payment_id, status).await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ReportSource for PgStore {
    async fn members(&self) -> AppResult<Vec<GymMember>> {
        let mut conn = self.pool.acquire().await?;
        member::list_members(&mut conn).await
    }

    async fn memberships(&self) -> AppResult<Vec<MembershipRow>> {
        let mut conn = self.pool.acquire().await?;
        membership::list_memberships(&mut conn).await
    }

    async fn staff(&self, role: Option<RoleKind>) -> AppResult<Vec<StaffRecord>> {
        let mut conn = self.pool.acquire().await?;
        staff::list_staff(&mut conn, role).await
    }

    async fn plans(&self) -> AppResult<Vec<PlanOffer>> {
        let mut conn = self.pool.acquire().await?;
        plan::list_plans(&mut conn).await
    }

    async fn payments(&self) -> AppResult<Vec<Payment>> {
        let mut conn = self.pool.acquire().await?;
        payment::list_payments(&mut conn).await
    }

    async fn check_ins(&self) -> AppResult<Vec<CheckIn>> {
        let mut conn = self.pool.acquire().await?;
        activity::list_check_ins(&mut conn).await
    }

    async fn active_members(&self) -> AppResult<Vec<GymMember>> {
        let mut conn = self.pool.acquire().await?;
        member::list_active_members(&mut conn).await
    }

    async fn trainer_assignments(&self) -> AppResult<Vec<TrainerAssignment>> {
        let mut conn = self.pool.acquire().await?;
        activity::list_trainer_assignments(&mut conn).await
    }

    async fn guests(&self) -> AppResult<Vec<Guest>> {
        let mut conn = self.pool.acquire().await?;
        activity::list_guests(&mut conn).await
    }

    async fn guest_visits(&self) -> AppResult<Vec<GuestVisit>> {
        let mut conn = self.pool.acquire().await?;
        activity::list_guest_visits(&mut conn).await
    }

    async fn payment_history(&self, member_id: i32) -> AppResult<Vec<PaymentHistoryRow>> {
        let mut conn = self.pool.acquire().await?;
        payment::member_payment_history(&mut conn, member_id).await
    }

    async fn total_revenue(&self, status: Option<PaymentStatus>) -> AppResult<Decimal> {
        let mut conn = self.pool.acquire().await?;
        payment::total_revenue(&mut conn, status).await
    }
}
