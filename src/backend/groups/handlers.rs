/**
 * Group Handlers
 *
 * - `POST /groups` - create (or reuse an identical) group
 * - `GET /groups` - caller's groups, paginated
 * - `GET /groups/{group_id}` - one group with members
 * - `PUT /groups/{group_id}` - rename
 * - `PUT /groups/{group_id}/members` - add or remove a member
 * - `DELETE /groups/{group_id}` - delete with all messages
 *
 * Mutations require membership or the admin flag. Membership changes push
 * `join` / `leave` to the group's live members.
 */

use std::sync::Arc;

use axum::extract::{Path, State};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::db;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::chat::conversation::{is_member, member_ids, ConversationRecord};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::{AuthUser, AuthenticatedUser};
use crate::backend::realtime::FanoutRouter;
use crate::backend::server::config::ServerConfig;
use crate::backend::validation::{parse_uuid, resolve_page, ValidJson, ValidQuery};
use crate::shared::messaging::{
    ConversationId, CreateGroupRequest, GroupResponse, MemberAction, PageQuery,
    RenameGroupRequest, UpdateMemberRequest,
};
use crate::shared::{ApiResponse, ServerEvent};

async fn group_response(
    pool: &SqlitePool,
    record: ConversationRecord,
) -> Result<GroupResponse, sqlx::Error> {
    let members = db::group_members(pool, &record.id).await?;
    Ok(GroupResponse {
        created_at: record.created_at_utc(),
        id: record.id,
        name: record.name.unwrap_or_default(),
        avatar_path: record.avatar_path,
        members,
    })
}

/// Load a group the caller may change or read
async fn authorized_group(
    pool: &SqlitePool,
    caller: &AuthenticatedUser,
    raw_group_id: &str,
) -> Result<ConversationRecord, BackendError> {
    let id = ConversationId::for_group(parse_uuid("group_id", raw_group_id)?);
    let record = db::get_group(pool, &id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found group"))?;
    if !caller.is_admin && !is_member(pool, &id, caller.user_id).await? {
        return Err(BackendError::forbidden("You are not a member of this group"));
    }
    Ok(record)
}

/// Push an event to the current members of a group plus `extra`
async fn notify_members(
    pool: &SqlitePool,
    fanout: &FanoutRouter,
    group_id: &ConversationId,
    event: ServerEvent,
    extra: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    let mut recipients = member_ids(pool, group_id).await?;
    recipients.extend(extra);
    fanout.route(&event, &recipients).await;
    Ok(())
}

pub async fn create_group(
    State(pool): State<SqlitePool>,
    State(fanout): State<FanoutRouter>,
    AuthUser(caller): AuthUser,
    ValidJson(request): ValidJson<CreateGroupRequest>,
) -> BackendResult<ApiResponse<GroupResponse>> {
    request.validate()?;
    let (record, created) =
        db::create_group(&pool, &request.name, &request.users_id, caller.user_id).await?;
    let response = group_response(&pool, record).await?;

    if created {
        for member in &response.members {
            let event = ServerEvent::Join {
                username: member.username.clone(),
                room: response.name.clone(),
            };
            notify_members(&pool, &fanout, &response.id, event, None).await?;
        }
        tracing::info!("[Groups] {} created group {}", caller.username, response.id);
    }

    let message = if created {
        "Create group successfully"
    } else {
        "Group already exists"
    };
    Ok(ApiResponse::ok_with_message(response, message))
}

pub async fn list_groups(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<ServerConfig>>,
    AuthUser(caller): AuthUser,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> BackendResult<ApiResponse<Vec<GroupResponse>>> {
    let (page, page_size) = resolve_page(query, &config.pagination)?;
    let records = db::groups_for_user(&pool, caller.user_id, page, page_size).await?;

    let mut groups = Vec::with_capacity(records.len());
    for record in records {
        groups.push(group_response(&pool, record).await?);
    }
    Ok(ApiResponse::ok(groups))
}

pub async fn get_group(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
) -> BackendResult<ApiResponse<GroupResponse>> {
    let record = authorized_group(&pool, &caller, &group_id).await?;
    Ok(ApiResponse::ok(group_response(&pool, record).await?))
}

pub async fn rename_group(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
    ValidJson(request): ValidJson<RenameGroupRequest>,
) -> BackendResult<ApiResponse<GroupResponse>> {
    request.validate()?;
    let record = authorized_group(&pool, &caller, &group_id).await?;
    db::rename_group(&pool, &record.id, &request.name).await?;

    let renamed = db::get_group(&pool, &record.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found group"))?;
    tracing::info!("[Groups] {} renamed group {}", caller.username, renamed.id);
    Ok(ApiResponse::ok(group_response(&pool, renamed).await?))
}

/// Add or remove one member
///
/// Removing yourself is leaving the group.
pub async fn update_members(
    State(pool): State<SqlitePool>,
    State(fanout): State<FanoutRouter>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
    ValidJson(request): ValidJson<UpdateMemberRequest>,
) -> BackendResult<ApiResponse<GroupResponse>> {
    let record = authorized_group(&pool, &caller, &group_id).await?;
    let target = get_user_by_id(&pool, request.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Not found user"))?;
    let room = record.name.clone().unwrap_or_default();

    match request.action {
        MemberAction::Add => {
            if db::add_member(&pool, &record.id, target.id).await? {
                let event = ServerEvent::Join {
                    username: target.username.clone(),
                    room,
                };
                notify_members(&pool, &fanout, &record.id, event, None).await?;
            }
        }
        MemberAction::Remove => {
            if db::remove_member(&pool, &record.id, target.id).await? {
                let event = ServerEvent::Leave {
                    username: target.username.clone(),
                    room,
                };
                notify_members(&pool, &fanout, &record.id, event, Some(target.id)).await?;
            }
        }
    }

    tracing::info!(
        "[Groups] {} {:?} {} in group {}",
        caller.username,
        request.action,
        target.username,
        record.id
    );
    Ok(ApiResponse::ok(group_response(&pool, record).await?))
}

pub async fn delete_group(
    State(pool): State<SqlitePool>,
    AuthUser(caller): AuthUser,
    Path(group_id): Path<String>,
) -> BackendResult<ApiResponse<()>> {
    let record = authorized_group(&pool, &caller, &group_id).await?;
    if !db::delete_group(&pool, &record.id).await? {
        return Err(BackendError::not_found("Not found group"));
    }
    tracing::info!("[Groups] {} deleted group {}", caller.username, record.id);
    Ok(ApiResponse::message("Delete group successfully"))
}
