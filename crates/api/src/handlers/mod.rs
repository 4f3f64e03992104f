pub mod attendance;
pub mod audit;
pub mod auth;
pub mod donation;
pub mod event;
pub mod family;
pub mod group;
pub mod member;
pub mod notification;
pub mod report;
pub mod volunteer;

use church_core::types::DbId;
use church_db::models::member::Member;

use crate::error::AppResult;
use crate::state::AppState;

/// 404 unless the member exists.
pub(crate) async fn ensure_member(state: &AppState, id: DbId) -> AppResult<Member> {
    Ok(state.members.find_by_id(id).await?)
}
