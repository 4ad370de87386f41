//! Member registration, single-field updates and deletion.

use tracing::info;

use super::{expect_one_row, Bracket, UpdateOutcome, Workflows};
use crate::db::models::{GymMember, MemberChange, NewGymMember};
use crate::error::{AppError, AppResult};
use crate::validation;

/// Raw operator input for a new member. Empty optional fields mean "none".
#[derive(Debug, Clone, Default)]
pub struct RegisterMemberRequest {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub birthday: String,
    pub phone_number: String,
    pub email: String,
}

/// Member field an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberField {
    FirstName,
    LastName,
    PhoneNumber,
    Email,
}

impl MemberField {
    /// Validate `input` for this field.
    ///
    /// Empty phone or email input clears the value.
    pub fn parse(self, input: &str) -> AppResult<MemberChange> {
        Ok(match self {
            MemberField::FirstName => {
                MemberChange::FirstName(validation::require_name("First name", input)?)
            }
            MemberField::LastName => {
                MemberChange::LastName(validation::require_name("Last name", input)?)
            }
            MemberField::PhoneNumber => MemberChange::PhoneNumber(validation::optional_phone(input)?),
            MemberField::Email => MemberChange::Email(validation::optional_email(input)?),
        })
    }
}

impl Workflows {
    /// Validate and insert a new member.
    ///
    /// Age below 16 is an [`AppError::AgeRestriction`] and nothing is written.
    pub async fn register_member(&self, request: RegisterMemberRequest) -> AppResult<GymMember> {
        let new = NewGymMember {
            first_name: validation::require_name("First name", &request.first_name)?,
            last_name: validation::require_name("Last name", &request.last_name)?,
            birthday: validation::require_birthday(&request.birthday, self.today())?,
            phone_number: validation::optional_phone(&request.phone_number)?,
            email: validation::optional_email(&request.email)?,
        };

        let mut bracket = self.open("register_member").await?;
        bracket.committing();
        let outcome = bracket.uow().insert_member(&new).await;
        let member = bracket.close(outcome).await?;

        info!(member_id = member.member_id, "Gym member registered");
        Ok(member)
    }

    /// Change one field of an existing member.
    pub async fn update_member(
        &self,
        member_id: i32,
        field: MemberField,
        input: &str,
    ) -> AppResult<UpdateOutcome<GymMember>> {
        let member_id = validation::require_id("member ID", member_id)?;
        let change = field.parse(input)?;

        let mut bracket = self.open("update_member").await?;
        let outcome = update_member_steps(&mut bracket, member_id, &change).await;
        bracket.close(outcome).await
    }

    /// Delete a member. Dependent rows follow the store's cascade rules.
    pub async fn delete_member(&self, member_id: i32) -> AppResult<()> {
        let member_id = validation::require_id("member ID", member_id)?;

        let mut bracket = self.open("delete_member").await?;
        let outcome = delete_member_steps(&mut bracket, member_id).await;
        bracket.close(outcome).await?;

        info!(member_id, "Gym member deleted");
        Ok(())
    }
}

async fn update_member_steps(
    bracket: &mut Bracket,
    member_id: i32,
    change: &MemberChange,
) -> AppResult<UpdateOutcome<GymMember>> {
    let current = bracket
        .uow()
        .find_member(member_id)
        .await?
        .ok_or_else(|| member_not_found(member_id))?;
    if change.is_noop_for(&current) {
        return Ok(UpdateOutcome::Unchanged(current));
    }

    bracket.committing();
    let updated = bracket.uow().update_member(member_id, change).await?;
    expect_one_row(updated, "gym.gym_member")?;

    let mut after = current.clone();
    change.apply_to(&mut after);
    Ok(UpdateOutcome::Updated {
        before: current,
        after,
    })
}

async fn delete_member_steps(bracket: &mut Bracket, member_id: i32) -> AppResult<()> {
    if !bracket.uow().member_exists(member_id).await? {
        return Err(member_not_found(member_id));
    }
    bracket.committing();
    let deleted = bracket.uow().delete_member(member_id).await?;
    expect_one_row(deleted, "gym.gym_member")
}

pub(super) fn member_not_found(member_id: i32) -> AppError {
    AppError::NotFound(format!("Member with ID {} does not exist.", member_id))
}
