//! Builtin catalog: every category, action, and query resource the
//! dispatcher exposes, plus the dynamic resolvers some actions use.

use serde_json::Value;

use crate::error::ResolveError;
use crate::operation::OperationKind::{self, *};
use crate::params::{move_key, Params};
use crate::registry::{ActionDef, CategoryDef, Rename, ResourceDef, Target};

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

const fn fixed(name: &'static str, summary: &'static str, kind: OperationKind) -> ActionDef {
    ActionDef {
        name,
        summary,
        target: Target::Fixed(kind),
        renames: &[],
    }
}

const fn renamed(
    name: &'static str,
    summary: &'static str,
    kind: OperationKind,
    renames: &'static [Rename],
) -> ActionDef {
    ActionDef {
        name,
        summary,
        target: Target::Fixed(kind),
        renames,
    }
}

const fn resource(
    name: &'static str,
    summary: &'static str,
    operation: OperationKind,
    renames: &'static [Rename],
) -> ResourceDef {
    ResourceDef {
        name,
        summary,
        operation,
        renames,
    }
}

// ---------------------------------------------------------------------------
// Dynamic resolvers
// ---------------------------------------------------------------------------

/// Reads a discriminator value as text, removing it from `params`.
/// `null` counts as absent.
fn take_discriminator(params: &mut Params, key: &str) -> Option<String> {
    match params.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

const CHANNEL_TYPES: &[&str] = &["text", "voice", "category", "forum"];

/// `channel.create`: routes on `type`, defaulting to a text channel.
fn resolve_channel_create(params: &mut Params) -> Result<OperationKind, ResolveError> {
    let Some(channel_type) = take_discriminator(params, "type") else {
        return Ok(CreateTextChannel);
    };
    match channel_type.as_str() {
        "text" => Ok(CreateTextChannel),
        "voice" => Ok(CreateVoiceChannel),
        "category" => Ok(CreateCategory),
        "forum" => Ok(CreateForumChannel),
        _ => Err(ResolveError::Discriminator {
            key: "type",
            value: channel_type,
            expected: CHANNEL_TYPES,
        }),
    }
}

const PERMISSION_TARGETS: &[&str] = &["role", "member"];

/// `channel.permissions`: routes on `targetType` and moves `targetId` to the
/// id key the chosen operation expects. Without `targetType`, an explicit
/// `roleId` or `userId` decides.
fn resolve_channel_permissions(params: &mut Params) -> Result<OperationKind, ResolveError> {
    let target = take_discriminator(params, "targetType").or_else(|| {
        if params.contains_key("roleId") {
            Some("role".to_string())
        } else if params.contains_key("userId") {
            Some("member".to_string())
        } else {
            None
        }
    });
    match target.as_deref() {
        Some("role") => {
            move_key(params, "targetId", "roleId");
            Ok(SetRolePermissions)
        }
        Some("member") => {
            move_key(params, "targetId", "userId");
            Ok(SetMemberPermissions)
        }
        other => Err(ResolveError::Discriminator {
            key: "targetType",
            value: other.unwrap_or_default().to_string(),
            expected: PERMISSION_TARGETS,
        }),
    }
}

/// `reaction.add`: a list of emojis (under `emojis`, or an array passed as
/// `emoji`) adds them all; a single emoji adds one.
fn resolve_reaction_add(params: &mut Params) -> Result<OperationKind, ResolveError> {
    if params.get("emoji").is_some_and(Value::is_array) {
        move_key(params, "emoji", "emojis");
    }
    if params.contains_key("emojis") {
        Ok(AddMultipleReactions)
    } else {
        Ok(AddReaction)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

const SERVER_ACTIONS: &[ActionDef] = &[
    fixed("info", "Show server details", GetServerInfo),
    fixed("edit", "Rename or re-describe the server", EditServer),
    renamed(
        "audit_log",
        "Read recent audit log entries",
        GetAuditLogs,
        &[Rename { from: "type", to: "actionType" }],
    ),
];

const CHANNEL_ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "create",
        summary: "Create a text, voice, category, or forum channel",
        target: Target::Dynamic {
            discriminator: "type",
            candidates: &[
                CreateTextChannel,
                CreateVoiceChannel,
                CreateCategory,
                CreateForumChannel,
            ],
            resolve: resolve_channel_create,
        },
        renames: &[Rename { from: "category", to: "parentId" }],
    },
    fixed("edit", "Change channel name and settings", EditChannel),
    fixed("delete", "Delete a channel", DeleteChannel),
    fixed("move", "Change a channel's position", SetChannelPosition),
    ActionDef {
        name: "permissions",
        summary: "Set a role or member permission overwrite",
        target: Target::Dynamic {
            discriminator: "targetType",
            candidates: &[SetRolePermissions, SetMemberPermissions],
            resolve: resolve_channel_permissions,
        },
        renames: &[],
    },
    fixed("info", "Show channel details", GetChannelInfo),
];

const MESSAGE_ACTIONS: &[ActionDef] = &[
    fixed("send", "Send a message", SendMessage),
    fixed("edit", "Edit a message", EditMessage),
    fixed("delete", "Delete a message", DeleteMessage),
    fixed("bulk_delete", "Delete the most recent messages", BulkDeleteMessages),
    fixed("pin", "Pin a message", PinMessage),
    fixed("unpin", "Unpin a message", UnpinMessage),
    renamed(
        "reply",
        "Reply to a message",
        ReplyToMessage,
        &[Rename { from: "replyTo", to: "messageId" }],
    ),
    fixed("embed", "Send a rich embed", SendEmbed),
];

const REACTION_ACTIONS: &[ActionDef] = &[
    ActionDef {
        name: "add",
        summary: "Add one or several reactions",
        target: Target::Dynamic {
            discriminator: "emojis",
            candidates: &[AddReaction, AddMultipleReactions],
            resolve: resolve_reaction_add,
        },
        renames: &[],
    },
    fixed("remove", "Remove a reaction", RemoveReaction),
    fixed("clear", "Remove every reaction from a message", ClearReactions),
];

const ROLE_ACTIONS: &[ActionDef] = &[
    fixed("create", "Create a role", CreateRole),
    fixed("edit", "Edit a role", EditRole),
    fixed("delete", "Delete a role", DeleteRole),
    fixed("assign", "Give a role to a member", AssignRole),
    fixed("remove", "Take a role from a member", RemoveRole),
    fixed("move", "Change a role's position", SetRolePosition),
];

const MEMBER_ACTIONS: &[ActionDef] = &[
    fixed("info", "Show member details", GetMemberInfo),
    fixed("kick", "Kick a member", KickMember),
    fixed("ban", "Ban a member", BanMember),
    fixed("unban", "Lift a ban", UnbanMember),
    fixed("timeout", "Time a member out", TimeoutMember),
    renamed(
        "nickname",
        "Set or clear a nickname",
        SetNickname,
        &[Rename { from: "nick", to: "nickname" }],
    ),
];

const VOICE_ACTIONS: &[ActionDef] = &[
    fixed("join", "Join a voice channel", JoinVoice),
    fixed("leave", "Leave voice in a server", LeaveVoice),
    fixed("move", "Move a member to another voice channel", MoveMember),
    fixed("disconnect", "Disconnect a member from voice", DisconnectMember),
    fixed("volume", "Set playback volume", SetVoiceVolume),
];

const THREAD_ACTIONS: &[ActionDef] = &[
    fixed("create", "Start a thread", CreateThread),
    fixed("archive", "Archive a thread", ArchiveThread),
    fixed("lock", "Lock a thread", LockThread),
    fixed("add_member", "Add a member to a thread", AddThreadMember),
];

const WEBHOOK_ACTIONS: &[ActionDef] = &[
    fixed("create", "Create a webhook", CreateWebhook),
    renamed(
        "send",
        "Post through a webhook",
        SendWebhookMessage,
        &[Rename { from: "token", to: "webhookToken" }, Rename { from: "name", to: "username" }],
    ),
    fixed("delete", "Delete a webhook", DeleteWebhook),
];

const INVITE_ACTIONS: &[ActionDef] = &[
    fixed("create", "Create an invite", CreateInvite),
    renamed(
        "delete",
        "Revoke an invite",
        DeleteInvite,
        &[Rename { from: "inviteCode", to: "code" }],
    ),
];

const EMOJI_ACTIONS: &[ActionDef] = &[
    renamed(
        "create",
        "Upload a custom emoji",
        CreateEmoji,
        &[Rename { from: "image", to: "imageUrl" }],
    ),
    fixed("delete", "Delete a custom emoji", DeleteEmoji),
];

const EVENT_ACTIONS: &[ActionDef] = &[
    renamed(
        "create",
        "Schedule an event",
        CreateEvent,
        &[Rename { from: "start", to: "startTime" }, Rename { from: "end", to: "endTime" }],
    ),
    fixed("delete", "Cancel a scheduled event", DeleteEvent),
];

/// Every builtin category, in help order.
pub static CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "server",
        summary: "Server settings and audit log",
        actions: SERVER_ACTIONS,
        default_resource: Some("server"),
    },
    CategoryDef {
        name: "channel",
        summary: "Channel lifecycle and permissions",
        actions: CHANNEL_ACTIONS,
        default_resource: Some("channels"),
    },
    CategoryDef {
        name: "message",
        summary: "Sending and managing messages",
        actions: MESSAGE_ACTIONS,
        default_resource: Some("messages"),
    },
    CategoryDef {
        name: "reaction",
        summary: "Message reactions",
        actions: REACTION_ACTIONS,
        default_resource: Some("reactions"),
    },
    CategoryDef {
        name: "role",
        summary: "Roles and role assignment",
        actions: ROLE_ACTIONS,
        default_resource: Some("roles"),
    },
    CategoryDef {
        name: "member",
        summary: "Member moderation",
        actions: MEMBER_ACTIONS,
        default_resource: Some("members"),
    },
    CategoryDef {
        name: "voice",
        summary: "Voice connections",
        actions: VOICE_ACTIONS,
        default_resource: None,
    },
    CategoryDef {
        name: "thread",
        summary: "Threads",
        actions: THREAD_ACTIONS,
        default_resource: Some("threads"),
    },
    CategoryDef {
        name: "webhook",
        summary: "Webhooks",
        actions: WEBHOOK_ACTIONS,
        default_resource: Some("webhooks"),
    },
    CategoryDef {
        name: "invite",
        summary: "Invites",
        actions: INVITE_ACTIONS,
        default_resource: Some("invites"),
    },
    CategoryDef {
        name: "emoji",
        summary: "Custom emojis",
        actions: EMOJI_ACTIONS,
        default_resource: Some("emojis"),
    },
    CategoryDef {
        name: "event",
        summary: "Scheduled events",
        actions: EVENT_ACTIONS,
        default_resource: Some("events"),
    },
];

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Every builtin query resource, in help order.
pub static RESOURCES: &[ResourceDef] = &[
    resource("servers", "Servers the bot is in", ListServers, &[]),
    resource("server", "Details of one server", GetServerInfo, &[]),
    resource(
        "audit_logs",
        "Audit log entries",
        GetAuditLogs,
        &[Rename { from: "type", to: "actionType" }],
    ),
    resource("channels", "Channels of a server", ListChannels, &[]),
    resource("channel_info", "Details of one channel", GetChannelInfo, &[]),
    resource("messages", "Recent messages in a channel", GetMessages, &[]),
    resource(
        "pinned_messages",
        "Pinned messages in a channel",
        GetPinnedMessages,
        &[],
    ),
    resource(
        "message_search",
        "Messages matching a search string",
        SearchMessages,
        &[Rename { from: "q", to: "query" }],
    ),
    resource("reactions", "Users who reacted with an emoji", GetReactions, &[]),
    resource("roles", "Roles of a server", ListRoles, &[]),
    resource("members", "Members of a server", ListMembers, &[]),
    resource("member_info", "Details of one member", GetMemberInfo, &[]),
    resource("bans", "Banned users", ListBans, &[]),
    resource("threads", "Active threads", ListActiveThreads, &[]),
    resource("webhooks", "Webhooks of a channel", ListWebhooks, &[]),
    resource("invites", "Invites of a server", ListInvites, &[]),
    resource("emojis", "Custom emojis of a server", ListEmojis, &[]),
    resource("events", "Scheduled events of a server", ListEvents, &[]),
];
