//! In-memory store with the same constraints as the PostgreSQL schema.
//!
//! A unit of work holds the store's lock for its whole lifetime and works on
//! a private copy of the tables. Commit swaps the copy in; rollback or drop
//! throws it away. Failures can be injected at chosen calls with
//! [`MemoryStore::fail_on`].

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{ReportSource, Store, UnitOfWork};
use crate::db::models::{
    CheckIn, Guest, GuestVisit, GymMember, MemberChange, Membership, MembershipRow,
    MembershipStatus, NewGymMember, NewMembership, NewPayment, NewStaffMember, Payment,
    PaymentHistoryRow, PaymentStatus, PlanOffer, PlanType, PlanTypeInfo, Role, RoleKind,
    StaffMember, StaffRecord, TrainerAssignment,
};
use crate::error::{AppError, AppResult, ConstrainedField, ConstraintViolation};

/// Repository call at which an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Begin,
    InsertMember,
    UpdateMember,
    DeleteMember,
    InsertMembership,
    UpdateMembershipPlan,
    UpdateMembershipStatus,
    InsertPlanType,
    InsertPlan,
    InsertStaff,
    InsertRole,
    UpdateStaffSalary,
    InsertPayment,
    UpdatePaymentStatus,
    Commit,
}

/// Table contents. Row IDs come from per-table sequences.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub members: BTreeMap<i32, GymMember>,
    pub memberships: BTreeMap<i32, Membership>,
    pub plan_types: BTreeMap<String, Decimal>,
    pub plans: BTreeMap<i32, String>,
    pub staff: BTreeMap<i32, StaffMember>,
    pub roles: BTreeMap<i32, Role>,
    pub payments: BTreeMap<i32, Payment>,
    pub check_ins: BTreeMap<i32, CheckIn>,
    pub guests: BTreeMap<i32, Guest>,
    /// `(visit_id, guest_id, member_id, visit_date)`
    pub guest_visits: BTreeMap<i32, (i32, Option<i32>, NaiveDate)>,
    /// `(trainer_id, member_id)`
    pub trainer_assignments: Vec<(i32, i32)>,
    sequences: Sequences,
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    member: i32,
    membership: i32,
    plan: i32,
    staff: i32,
    payment: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

struct State {
    tables: Tables,
    fail_points: HashSet<FailPoint>,
}

/// Store kept entirely in memory. Cloning shares the same tables.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    today: NaiveDate,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store whose default dates are the local current date.
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Empty store that stamps `date_joined` and `date_of_payment` with `today`.
    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                tables: Tables::default(),
                fail_points: HashSet::new(),
            })),
            today,
        }
    }

    /// Make every later call at `point` fail with an operational error.
    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.fail_points.insert(point);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.fail_points.clear();
    }

    /// Copy of the committed tables.
    pub async fn snapshot(&self) -> Tables {
        self.state.lock().await.tables.clone()
    }

    /// Seed or inspect committed tables directly, bypassing constraints.
    pub async fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.state.lock().await.tables)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        if guard.fail_points.contains(&FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        let work = guard.tables.clone();
        let fail_points = guard.fail_points.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            work,
            fail_points,
            today: self.today,
        }))
    }
}

fn injected(point: FailPoint) -> AppError {
    AppError::Operational(format!("injected failure at {:?}", point))
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    work: Tables,
    fail_points: HashSet<FailPoint>,
    today: NaiveDate,
}

impl MemoryUnitOfWork {
    fn check(&self, point: FailPoint) -> AppResult<()> {
        if self.fail_points.contains(&point) {
            return Err(injected(point));
        }
        Ok(())
    }

    fn check_member_contacts(
        &self,
        member_id: Option<i32>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<()> {
        let others = self
            .work
            .members
            .values()
            .filter(|m| Some(m.member_id) != member_id);
        for other in others {
            if phone.is_some() && other.phone_number.as_deref() == phone {
                return Err(ConstraintViolation::unique(
                    Some(ConstrainedField::PhoneNumber),
                    "gym_member_phone_number_key",
                )
                .into());
            }
            if email.is_some() && other.email.as_deref() == email {
                return Err(ConstraintViolation::unique(
                    Some(ConstrainedField::Email),
                    "gym_member_email_key",
                )
                .into());
            }
        }
        Ok(())
    }

    fn check_one_active(&self, member_id: i32, except: Option<i32>) -> AppResult<()> {
        let conflict = self.work.memberships.values().any(|m| {
            m.member_id == member_id
                && m.status == MembershipStatus::Active
                && Some(m.membership_id) != except
        });
        if conflict {
            return Err(ConstraintViolation::unique(
                Some(ConstrainedField::ActiveMembership),
                "membership_one_active_per_member",
            )
            .into());
        }
        Ok(())
    }

    fn plan_offer(&self, plan_id: i32) -> Option<PlanOffer> {
        plan_offer(&self.work, plan_id)
    }
}

fn plan_offer(tables: &Tables, plan_id: i32) -> Option<PlanOffer> {
    let plan_type = tables.plans.get(&plan_id)?;
    let price = tables.plan_types.get(plan_type)?;
    Some(PlanOffer {
        plan_id,
        plan_type: plan_type.clone(),
        price: *price,
    })
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_member(&mut self, member_id: i32) -> AppResult<Option<GymMember>> {
        Ok(self.work.members.get(&member_id).cloned())
    }

    async fn member_exists(&mut self, member_id: i32) -> AppResult<bool> {
        Ok(self.work.members.contains_key(&member_id))
    }

    async fn insert_member(&mut self, new: &NewGymMember) -> AppResult<GymMember> {
        self.check(FailPoint::InsertMember)?;
        self.check_member_contacts(None, new.phone_number.as_deref(), new.email.as_deref())?;

        let member = GymMember {
            member_id: next(&mut self.work.sequences.member),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            birthday: new.birthday,
            phone_number: new.phone_number.clone(),
            email: new.email.clone(),
            date_joined: self.today,
        };
        self.work.members.insert(member.member_id, member.clone());
        Ok(member)
    }

    async fn update_member(&mut self, member_id: i32, change: &MemberChange) -> AppResult<u64> {
        self.check(FailPoint::UpdateMember)?;
        match change {
            MemberChange::PhoneNumber(phone) => {
                self.check_member_contacts(Some(member_id), phone.as_deref(), None)?
            }
            MemberChange::Email(email) => {
                self.check_member_contacts(Some(member_id), None, email.as_deref())?
            }
            _ => {}
        }
        match self.work.members.get_mut(&member_id) {
            Some(member) => {
                change.apply_to(member);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_member(&mut self, member_id: i32) -> AppResult<u64> {
        self.check(FailPoint::DeleteMember)?;
        if self.work.members.remove(&member_id).is_none() {
            return Ok(0);
        }

        let tables = &mut self.work;
        let removed: HashSet<i32> = tables
            .memberships
            .values()
            .filter(|m| m.member_id == member_id)
            .map(|m| m.membership_id)
            .collect();
        tables.memberships.retain(|_, m| m.member_id != member_id);
        tables.payments.retain(|_, p| p.member_id != member_id);
        tables
            .check_ins
            .retain(|_, c| !removed.contains(&c.membership_id));
        tables
            .guest_visits
            .retain(|_, (_, member, _)| *member != Some(member_id));
        tables.trainer_assignments.retain(|(_, m)| *m != member_id);
        Ok(1)
    }

    async fn find_membership(&mut self, membership_id: i32) -> AppResult<Option<Membership>> {
        Ok(self.work.memberships.get(&membership_id).cloned())
    }

    async fn latest_membership(&mut self, member_id: i32) -> AppResult<Option<Membership>> {
        Ok(self
            .work
            .memberships
            .values()
            .rev()
            .find(|m| m.member_id == member_id)
            .cloned())
    }

    async fn has_active_membership(&mut self, member_id: i32) -> AppResult<bool> {
        Ok(self
            .work
            .memberships
            .values()
            .any(|m| m.member_id == member_id && m.status == MembershipStatus::Active))
    }

    async fn insert_membership(&mut self, new: &NewMembership) -> AppResult<Membership> {
        self.check(FailPoint::InsertMembership)?;
        if !self.work.members.contains_key(&new.member_id) {
            return Err(ConstraintViolation::foreign_key("membership_member_id_fkey").into());
        }
        if !self.work.plans.contains_key(&new.plan_id) {
            return Err(ConstraintViolation::foreign_key("membership_plan_id_fkey").into());
        }
        self.check_one_active(new.member_id, None)?;

        let membership = Membership {
            membership_id: next(&mut self.work.sequences.membership),
            member_id: new.member_id,
            plan_id: new.plan_id,
            start_date: new.start_date,
            end_date: new.end_date,
            status: MembershipStatus::Active,
        };
        self.work
            .memberships
            .insert(membership.membership_id, membership.clone());
        Ok(membership)
    }

    async fn update_membership_plan(
        &mut self,
        membership_id: i32,
        plan_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<u64> {
        self.check(FailPoint::UpdateMembershipPlan)?;
        if !self.work.plans.contains_key(&plan_id) {
            return Err(ConstraintViolation::foreign_key("membership_plan_id_fkey").into());
        }
        match self.work.memberships.get_mut(&membership_id) {
            Some(membership) => {
                membership.plan_id = plan_id;
                membership.start_date = start_date;
                membership.end_date = end_date;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_membership_status(
        &mut self,
        membership_id: i32,
        status: MembershipStatus,
    ) -> AppResult<u64> {
        self.check(FailPoint::UpdateMembershipStatus)?;
        let Some(member_id) = self
            .work
            .memberships
            .get(&membership_id)
            .map(|m| m.member_id)
        else {
            return Ok(0);
        };
        if status == MembershipStatus::Active {
            self.check_one_active(member_id, Some(membership_id))?;
        }
        if let Some(membership) = self.work.memberships.get_mut(&membership_id) {
            membership.status = status;
        }
        Ok(1)
    }

    async fn list_plans(&mut self) -> AppResult<Vec<PlanOffer>> {
        Ok(self
            .work
            .plans
            .keys()
            .filter_map(|id| self.plan_offer(*id))
            .collect())
    }

    async fn find_plan(&mut self, plan_id: i32) -> AppResult<Option<PlanOffer>> {
        Ok(self.plan_offer(plan_id))
    }

    async fn list_plan_types(&mut self) -> AppResult<Vec<PlanTypeInfo>> {
        Ok(self
            .work
            .plan_types
            .iter()
            .map(|(plan_type, price)| PlanTypeInfo {
                plan_type: plan_type.clone(),
                price: *price,
            })
            .collect())
    }

    async fn find_plan_type(&mut self, plan_type: PlanType) -> AppResult<Option<PlanTypeInfo>> {
        Ok(self
            .work
            .plan_types
            .get(plan_type.as_str())
            .map(|price| PlanTypeInfo {
                plan_type: plan_type.as_str().to_string(),
                price: *price,
            }))
    }

    async fn insert_plan_type(
        &mut self,
        plan_type: PlanType,
        price: Decimal,
    ) -> AppResult<PlanTypeInfo> {
        self.check(FailPoint::InsertPlanType)?;
        if self.work.plan_types.contains_key(plan_type.as_str()) {
            return Err(ConstraintViolation::unique(
                Some(ConstrainedField::PlanType),
                "plan_type_info_pkey",
            )
            .into());
        }
        self.work
            .plan_types
            .insert(plan_type.as_str().to_string(), price);
        Ok(PlanTypeInfo {
            plan_type: plan_type.as_str().to_string(),
            price,
        })
    }

    async fn insert_plan(&mut self, plan_type: PlanType) -> AppResult<PlanOffer> {
        self.check(FailPoint::InsertPlan)?;
        let Some(price) = self.work.plan_types.get(plan_type.as_str()).copied() else {
            return Err(ConstraintViolation::foreign_key("plan_plan_type_fkey").into());
        };
        let plan_id = next(&mut self.work.sequences.plan);
        self.work
            .plans
            .insert(plan_id, plan_type.as_str().to_string());
        Ok(PlanOffer {
            plan_id,
            plan_type: plan_type.as_str().to_string(),
            price,
        })
    }

    async fn find_staff(&mut self, staff_id: i32) -> AppResult<Option<StaffMember>> {
        Ok(self.work.staff.get(&staff_id).cloned())
    }

    async fn insert_staff(&mut self, new: &NewStaffMember) -> AppResult<StaffMember> {
        self.check(FailPoint::InsertStaff)?;
        for other in self.work.staff.values() {
            if new.phone_number.is_some() && other.phone_number == new.phone_number {
                return Err(ConstraintViolation::unique(
                    Some(ConstrainedField::PhoneNumber),
                    "staff_member_phone_number_key",
                )
                .into());
            }
            if new.email.is_some() && other.email == new.email {
                return Err(ConstraintViolation::unique(
                    Some(ConstrainedField::Email),
                    "staff_member_email_key",
                )
                .into());
            }
        }

        let staff = StaffMember {
            staff_id: next(&mut self.work.sequences.staff),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            phone_number: new.phone_number.clone(),
            email: new.email.clone(),
            hire_date: new.hire_date,
            salary: new.salary,
        };
        self.work.staff.insert(staff.staff_id, staff.clone());
        Ok(staff)
    }

    async fn insert_role(&mut self, staff_id: i32, role: &Role) -> AppResult<()> {
        self.check(FailPoint::InsertRole)?;
        let table = match role.kind() {
            RoleKind::Desk => "desk",
            RoleKind::Trainer => "trainer",
            RoleKind::Manager => "manager",
        };
        if !self.work.staff.contains_key(&staff_id) {
            return Err(ConstraintViolation::foreign_key(format!("{}_staff_id_fkey", table)).into());
        }
        if self.work.roles.contains_key(&staff_id) {
            return Err(ConstraintViolation::unique(None, format!("{}_pkey", table)).into());
        }
        if let Role::Manager(manager) = role {
            let taken = self.work.roles.values().any(|r| {
                matches!(r, Role::Manager(m) if m.office_location == manager.office_location)
            });
            if taken {
                return Err(ConstraintViolation::unique(
                    Some(ConstrainedField::OfficeLocation),
                    "manager_office_location_key",
                )
                .into());
            }
        }
        self.work.roles.insert(staff_id, role.clone());
        Ok(())
    }

    async fn is_desk_staff(&mut self, staff_id: i32) -> AppResult<bool> {
        Ok(matches!(self.work.roles.get(&staff_id), Some(Role::Desk(_))))
    }

    async fn list_desk_staff(&mut self) -> AppResult<Vec<StaffMember>> {
        Ok(self
            .work
            .staff
            .values()
            .filter(|s| matches!(self.work.roles.get(&s.staff_id), Some(Role::Desk(_))))
            .cloned()
            .collect())
    }

    async fn update_staff_salary(&mut self, staff_id: i32, salary: Decimal) -> AppResult<u64> {
        self.check(FailPoint::UpdateStaffSalary)?;
        match self.work.staff.get_mut(&staff_id) {
            Some(staff) => {
                staff.salary = salary;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find_payment(&mut self, payment_id: i32) -> AppResult<Option<Payment>> {
        Ok(self.work.payments.get(&payment_id).cloned())
    }

    async fn insert_payment(&mut self, new: &NewPayment) -> AppResult<Payment> {
        self.check(FailPoint::InsertPayment)?;
        if !self.work.staff.contains_key(&new.staff_id) {
            return Err(ConstraintViolation::foreign_key("payment_staff_id_fkey").into());
        }
        if !self.work.members.contains_key(&new.member_id) {
            return Err(ConstraintViolation::foreign_key("payment_member_id_fkey").into());
        }

        let payment = Payment {
            payment_id: next(&mut self.work.sequences.payment),
            staff_id: new.staff_id,
            member_id: new.member_id,
            amount: new.amount,
            payment_type: new.payment_type,
            date_of_payment: self.today,
            status: PaymentStatus::Success,
        };
        self.work.payments.insert(payment.payment_id, payment.clone());
        Ok(payment)
    }

    async fn update_payment_status(
        &mut self,
        payment_id: i32,
        status: PaymentStatus,
    ) -> AppResult<u64> {
        self.check(FailPoint::UpdatePaymentStatus)?;
        match self.work.payments.get_mut(&payment_id) {
            Some(payment) => {
                payment.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.check(FailPoint::Commit)?;
        let MemoryUnitOfWork {
            mut guard, work, ..
        } = *self;
        guard.tables = work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ReportSource for MemoryStore {
    async fn members(&self) -> AppResult<Vec<GymMember>> {
        let state = self.state.lock().await;
        Ok(state.tables.members.values().cloned().collect())
    }

    async fn memberships(&self) -> AppResult<Vec<MembershipRow>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        Ok(t.memberships
            .values()
            .map(|ms| {
                let member = t.members.get(&ms.member_id);
                let offer = plan_offer(t, ms.plan_id);
                MembershipRow {
                    membership_id: ms.membership_id,
                    member_id: ms.member_id,
                    first_name: member.map(|m| m.first_name.clone()),
                    last_name: member.map(|m| m.last_name.clone()),
                    status: ms.status.to_string(),
                    plan_type: offer.as_ref().map(|o| o.plan_type.clone()),
                    price: offer.map(|o| o.price),
                    start_date: ms.start_date,
                    end_date: ms.end_date,
                }
            })
            .collect())
    }

    async fn staff(&self, role: Option<RoleKind>) -> AppResult<Vec<StaffRecord>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        Ok(t.staff
            .values()
            .map(|s| StaffRecord {
                staff: s.clone(),
                role: t.roles.get(&s.staff_id).cloned(),
            })
            .filter(|r| match role {
                None => true,
                Some(kind) => r.role.as_ref().map(Role::kind) == Some(kind),
            })
            .collect())
    }

    async fn plans(&self) -> AppResult<Vec<PlanOffer>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        Ok(t.plans.keys().filter_map(|id| plan_offer(t, *id)).collect())
    }

    async fn payments(&self) -> AppResult<Vec<Payment>> {
        let state = self.state.lock().await;
        Ok(state.tables.payments.values().cloned().collect())
    }

    async fn check_ins(&self) -> AppResult<Vec<CheckIn>> {
        let state = self.state.lock().await;
        Ok(state.tables.check_ins.values().cloned().collect())
    }

    async fn active_members(&self) -> AppResult<Vec<GymMember>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        let active: HashSet<i32> = t
            .memberships
            .values()
            .filter(|m| m.status == MembershipStatus::Active)
            .map(|m| m.member_id)
            .collect();
        Ok(t.members
            .values()
            .filter(|m| active.contains(&m.member_id))
            .cloned()
            .collect())
    }

    async fn trainer_assignments(&self) -> AppResult<Vec<TrainerAssignment>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        let mut pairs = t.trainer_assignments.clone();
        pairs.sort_unstable();
        Ok(pairs
            .into_iter()
            .filter_map(|(trainer_id, member_id)| {
                let trainer = t.staff.get(&trainer_id)?;
                let member = t.members.get(&member_id)?;
                Some(TrainerAssignment {
                    trainer_id,
                    trainer_first_name: trainer.first_name.clone(),
                    trainer_last_name: trainer.last_name.clone(),
                    member_id,
                    member_first_name: member.first_name.clone(),
                    member_last_name: member.last_name.clone(),
                })
            })
            .collect())
    }

    async fn guests(&self) -> AppResult<Vec<Guest>> {
        let state = self.state.lock().await;
        Ok(state.tables.guests.values().cloned().collect())
    }

    async fn guest_visits(&self) -> AppResult<Vec<GuestVisit>> {
        let state = self.state.lock().await;
        let t = &state.tables;
        Ok(t.guest_visits
            .iter()
            .filter_map(|(visit_id, (guest_id, member_id, visit_date))| {
                let guest = t.guests.get(guest_id)?;
                Some(GuestVisit {
                    visit_id: *visit_id,
                    guest_id: *guest_id,
                    guest_first_name: guest.first_name.clone(),
                    guest_last_name: guest.last_name.clone(),
                    member_id: *member_id,
                    visit_date: *visit_date,
                })
            })
            .collect())
    }

    async fn payment_history(&self, member_id: i32) -> AppResult<Vec<PaymentHistoryRow>> {
        let state = self.state.lock().await;
        let mut rows: Vec<PaymentHistoryRow> = state
            .tables
            .payments
            .values()
            .filter(|p| p.member_id == member_id)
            .map(|p| PaymentHistoryRow {
                payment_id: p.payment_id,
                date_of_payment: p.date_of_payment,
                amount: p.amount,
                payment_type: p.payment_type.to_string(),
                status: p.status.to_string(),
                staff_id: p.staff_id,
            })
            .collect();
        rows.sort_by_key(|r| (r.date_of_payment, r.payment_id));
        Ok(rows)
    }

    async fn total_revenue(&self, status: Option<PaymentStatus>) -> AppResult<Decimal> {
        let state = self.state.lock().await;
        Ok(state
            .tables
            .payments
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .map(|p| p.amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{DeskRole, ManagerRole, PaymentType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn new_member(first: &str, phone: Option<&str>) -> NewGymMember {
        NewGymMember {
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 5).unwrap(),
            phone_number: phone.map(str::to_string),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_work_is_discarded() {
        let store = MemoryStore::with_today(today());
        let mut uow = store.begin().await.unwrap();
        uow.insert_member(&new_member("Ana", None)).await.unwrap();
        drop(uow);
        assert!(store.snapshot().await.members.is_empty());

        let mut uow = store.begin().await.unwrap();
        let member = uow.insert_member(&new_member("Ana", None)).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(member.date_joined, today());
        assert_eq!(store.snapshot().await.members.len(), 1);
    }

    #[tokio::test]
    async fn test_member_phone_is_unique() {
        let store = MemoryStore::with_today(today());
        let mut uow = store.begin().await.unwrap();
        uow.insert_member(&new_member("Ana", Some("5551234567")))
            .await
            .unwrap();
        let err = uow
            .insert_member(&new_member("Bea", Some("5551234567")))
            .await
            .unwrap_err();
        let AppError::Constraint(violation) = err else {
            panic!("expected constraint violation");
        };
        assert_eq!(violation.field, Some(ConstrainedField::PhoneNumber));
    }

    #[tokio::test]
    async fn test_one_active_membership_enforced() {
        let store = MemoryStore::with_today(today());
        let mut uow = store.begin().await.unwrap();
        let member = uow.insert_member(&new_member("Ana", None)).await.unwrap();
        uow.insert_plan_type(PlanType::Monthly, Decimal::new(2999, 2))
            .await
            .unwrap();
        let plan = uow.insert_plan(PlanType::Monthly).await.unwrap();
        let new = NewMembership {
            member_id: member.member_id,
            plan_id: plan.plan_id,
            start_date: today(),
            end_date: today(),
        };
        let first = uow.insert_membership(&new).await.unwrap();
        assert!(matches!(
            uow.insert_membership(&new).await,
            Err(AppError::Constraint(_))
        ));

        uow.update_membership_status(first.membership_id, MembershipStatus::Paused)
            .await
            .unwrap();
        let second = uow.insert_membership(&new).await.unwrap();
        assert!(matches!(
            uow.update_membership_status(first.membership_id, MembershipStatus::Active)
                .await,
            Err(AppError::Constraint(_))
        ));
        assert_eq!(
            uow.latest_membership(member.member_id).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_delete_member_cascades() {
        let store = MemoryStore::with_today(today());
        let mut uow = store.begin().await.unwrap();
        let member = uow.insert_member(&new_member("Ana", None)).await.unwrap();
        let staff = uow
            .insert_staff(&NewStaffMember {
                first_name: "Dee".to_string(),
                last_name: "Desk".to_string(),
                phone_number: None,
                email: None,
                hire_date: today(),
                salary: Decimal::ZERO,
            })
            .await
            .unwrap();
        uow.insert_payment(&NewPayment {
            staff_id: staff.staff_id,
            member_id: member.member_id,
            amount: Decimal::ONE,
            payment_type: PaymentType::Cash,
        })
        .await
        .unwrap();
        assert_eq!(uow.delete_member(member.member_id).await.unwrap(), 1);
        assert_eq!(uow.delete_member(member.member_id).await.unwrap(), 0);
        uow.commit().await.unwrap();

        let tables = store.snapshot().await;
        assert!(tables.payments.is_empty());
        assert_eq!(tables.staff.len(), 1);
    }

    #[tokio::test]
    async fn test_office_location_unique_and_single_role() {
        let store = MemoryStore::with_today(today());
        let mut uow = store.begin().await.unwrap();
        let staff = |first: &str| NewStaffMember {
            first_name: first.to_string(),
            last_name: "Boss".to_string(),
            phone_number: None,
            email: None,
            hire_date: today(),
            salary: Decimal::ZERO,
        };
        let manager = Role::Manager(ManagerRole {
            department: "Ops".to_string(),
            office_location: "B-1".to_string(),
            experience: None,
        });
        let a = uow.insert_staff(&staff("Al")).await.unwrap();
        let b = uow.insert_staff(&staff("Bo")).await.unwrap();
        uow.insert_role(a.staff_id, &manager).await.unwrap();

        let err = uow.insert_role(b.staff_id, &manager).await.unwrap_err();
        let AppError::Constraint(violation) = err else {
            panic!("expected constraint violation");
        };
        assert_eq!(violation.field, Some(ConstrainedField::OfficeLocation));

        let desk = Role::Desk(DeskRole {
            schedule: "Mon- 9AM-5PM".to_string(),
            desk_location: "Front".to_string(),
            responsibility: "Check-in".to_string(),
        });
        assert!(uow.insert_role(a.staff_id, &desk).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_point_fires() {
        let store = MemoryStore::with_today(today());
        store.fail_on(FailPoint::InsertMember).await;
        let mut uow = store.begin().await.unwrap();
        let err = uow.insert_member(&new_member("Ana", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Operational(_)));
        drop(uow);

        store.clear_failures().await;
        let mut uow = store.begin().await.unwrap();
        assert!(uow.insert_member(&new_member("Ana", None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_total_revenue_by_status() {
        let store = MemoryStore::with_today(today());
        store
            .with_tables(|t| {
                for (id, status) in [
                    (1, PaymentStatus::Success),
                    (2, PaymentStatus::Success),
                    (3, PaymentStatus::Refunded),
                ] {
                    t.payments.insert(
                        id,
                        Payment {
                            payment_id: id,
                            staff_id: 1,
                            member_id: 1,
                            amount: Decimal::new(1000, 2),
                            payment_type: PaymentType::Card,
                            date_of_payment: today(),
                            status,
                        },
                    );
                }
            })
            .await;

        assert_eq!(store.total_revenue(None).await.unwrap(), Decimal::new(3000, 2));
        assert_eq!(
            store
                .total_revenue(Some(PaymentStatus::Success))
                .await
                .unwrap(),
            Decimal::new(2000, 2)
        );
        assert_eq!(
            store
                .total_revenue(Some(PaymentStatus::Pending))
                .await
                .unwrap(),
            Decimal::ZERO
        );
    }
}
