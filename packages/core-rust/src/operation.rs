//! Typed catalog of the underlying chat-platform operations.
//!
//! Every operation the platform collaborator can perform is one variant of
//! [`OperationKind`] with a fixed, declared argument order, and one variant of
//! [`Operation`] carrying a typed argument struct from [`args`]. Because the
//! catalog is a closed enum, an operation without a declared argument order
//! cannot exist, and an unknown operation name is a compile error in the
//! registry tables rather than a runtime lookup miss.
//!
//! The declared key `options` is the packed-options slot (see
//! [`crate::position`]).

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BindError;

// ---------------------------------------------------------------------------
// Shared argument types
// ---------------------------------------------------------------------------

/// Optional channel settings packed into the trailing `options` argument of
/// the channel create/edit operations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOptions {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nsfw: Option<bool>,
    /// Per-user rate limit in seconds, as text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slowmode: Option<String>,
    /// Voice channel user limit, as text.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bitrate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub allowed_roles: Option<Vec<String>>,
}

/// One field of a rich embed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

// ---------------------------------------------------------------------------
// Catalog macro
// ---------------------------------------------------------------------------

/// Generates `OperationKind`, the `args` structs, and `Operation` from one
/// table so the three can never drift apart.
macro_rules! operations {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident = $name:literal {
                $( $field:ident : $ty:ty = $key:literal ),* $(,)?
            }
        )*
    ) => {
        /// Discriminant of an underlying platform operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum OperationKind {
            $( $(#[$meta])* $variant, )*
        }

        impl OperationKind {
            /// Every operation, in catalog order.
            pub const ALL: &'static [OperationKind] = &[ $( OperationKind::$variant, )* ];

            /// Wire name of the operation (e.g. `"sendMessage"`).
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $( OperationKind::$variant => $name, )*
                }
            }

            /// Declared positional argument order, as parameter keys.
            #[must_use]
            pub fn arg_order(self) -> &'static [&'static str] {
                match self {
                    $( OperationKind::$variant => &[ $( $key, )* ], )*
                }
            }
        }

        /// Typed argument structs, one per operation, fields in positional order.
        pub mod args {
            use serde::{Deserialize, Serialize};
            use serde_json::Value;

            use super::{ChannelOptions, EmbedField};

            $(
                #[doc = concat!("Arguments of `", $name, "`.")]
                #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
                pub struct $variant {
                    $(
                        #[serde(rename = $key)]
                        pub $field: $ty,
                    )*
                }
            )*
        }

        /// A fully bound platform operation.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "operation", content = "args")]
        pub enum Operation {
            $(
                #[serde(rename = $name)]
                $variant(args::$variant),
            )*
        }

        impl Operation {
            /// Returns the discriminant of this operation.
            #[must_use]
            pub fn kind(&self) -> OperationKind {
                match self {
                    $( Operation::$variant(_) => OperationKind::$variant, )*
                }
            }

            /// Binds a positional argument list to the typed arguments of `kind`.
            ///
            /// Slot `i` of `slots` fills the `i`-th declared key. Missing trailing
            /// slots are treated as `null`.
            ///
            /// # Errors
            ///
            /// Returns `BindError::Missing` when a required slot is `null` and
            /// `BindError::Invalid` when a slot holds a value of the wrong shape.
            #[allow(unused_variables, unused_mut)]
            pub fn bind(kind: OperationKind, slots: Vec<Value>) -> Result<Self, BindError> {
                let mut slots = slots.into_iter();
                match kind {
                    $(
                        OperationKind::$variant => Ok(Operation::$variant(args::$variant {
                            $( $field: bind_slot(&mut slots, $key)?, )*
                        })),
                    )*
                }
            }
        }
    };
}

fn bind_slot<T, I>(slots: &mut I, key: &'static str) -> Result<T, BindError>
where
    T: DeserializeOwned,
    I: Iterator<Item = Value>,
{
    let value = slots.next().unwrap_or(Value::Null);
    let was_null = value.is_null();
    serde_json::from_value(value).map_err(|err| {
        if was_null {
            BindError::Missing { key }
        } else {
            BindError::Invalid {
                key,
                reason: err.to_string(),
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

operations! {
    // ----- Server -----
    ListServers = "listServers" {}
    GetServerInfo = "getServerInfo" {
        guild_id: Option<String> = "guildId",
    }
    EditServer = "editServer" {
        guild_id: Option<String> = "guildId",
        name: Option<String> = "name",
        description: Option<String> = "description",
        reason: Option<String> = "reason",
    }
    GetAuditLogs = "getAuditLogs" {
        guild_id: Option<String> = "guildId",
        action_type: Option<String> = "actionType",
        user_id: Option<String> = "userId",
        count: Option<String> = "count",
    }

    // ----- Channels -----
    CreateTextChannel = "createTextChannel" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        options: Option<ChannelOptions> = "options",
    }
    CreateVoiceChannel = "createVoiceChannel" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        options: Option<ChannelOptions> = "options",
    }
    CreateCategory = "createCategory" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        options: Option<ChannelOptions> = "options",
    }
    CreateForumChannel = "createForumChannel" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        options: Option<ChannelOptions> = "options",
    }
    EditChannel = "editChannel" {
        channel_id: String = "channelId",
        name: Option<String> = "name",
        options: Option<ChannelOptions> = "options",
    }
    DeleteChannel = "deleteChannel" {
        channel_id: String = "channelId",
        reason: Option<String> = "reason",
    }
    SetChannelPosition = "setChannelPosition" {
        channel_id: String = "channelId",
        position: String = "position",
    }
    ListChannels = "listChannels" {
        guild_id: Option<String> = "guildId",
    }
    GetChannelInfo = "getChannelInfo" {
        channel_id: String = "channelId",
    }
    SetRolePermissions = "setRolePermissions" {
        channel_id: String = "channelId",
        role_id: String = "roleId",
        allow: Option<Vec<String>> = "allow",
        deny: Option<Vec<String>> = "deny",
    }
    SetMemberPermissions = "setMemberPermissions" {
        channel_id: String = "channelId",
        user_id: String = "userId",
        allow: Option<Vec<String>> = "allow",
        deny: Option<Vec<String>> = "deny",
    }

    // ----- Messages -----
    SendMessage = "sendMessage" {
        channel_id: String = "channelId",
        message: String = "message",
    }
    EditMessage = "editMessage" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        message: String = "message",
    }
    DeleteMessage = "deleteMessage" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
    }
    BulkDeleteMessages = "bulkDeleteMessages" {
        channel_id: String = "channelId",
        count: String = "count",
    }
    PinMessage = "pinMessage" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
    }
    UnpinMessage = "unpinMessage" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
    }
    ReplyToMessage = "replyToMessage" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        message: String = "message",
    }
    SendEmbed = "sendEmbed" {
        channel_id: String = "channelId",
        title: Option<String> = "title",
        description: Option<String> = "description",
        color: Option<Value> = "color",
        fields: Option<Vec<EmbedField>> = "fields",
    }
    GetMessages = "getMessages" {
        channel_id: String = "channelId",
        count: Option<String> = "count",
    }
    GetPinnedMessages = "getPinnedMessages" {
        channel_id: String = "channelId",
    }
    SearchMessages = "searchMessages" {
        channel_id: String = "channelId",
        query: String = "query",
        count: Option<String> = "count",
    }

    // ----- Reactions -----
    AddReaction = "addReaction" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        emoji: String = "emoji",
    }
    AddMultipleReactions = "addMultipleReactions" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        emojis: Vec<String> = "emojis",
    }
    RemoveReaction = "removeReaction" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        emoji: String = "emoji",
        user_id: Option<String> = "userId",
    }
    ClearReactions = "clearReactions" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
    }
    GetReactions = "getReactions" {
        channel_id: String = "channelId",
        message_id: String = "messageId",
        emoji: String = "emoji",
        count: Option<String> = "count",
    }

    // ----- Roles -----
    CreateRole = "createRole" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        color: Option<Value> = "color",
        hoist: Option<bool> = "hoist",
        mentionable: Option<bool> = "mentionable",
        permissions: Option<Vec<String>> = "permissions",
    }
    EditRole = "editRole" {
        guild_id: Option<String> = "guildId",
        role_id: String = "roleId",
        name: Option<String> = "name",
        color: Option<Value> = "color",
        hoist: Option<bool> = "hoist",
        mentionable: Option<bool> = "mentionable",
    }
    DeleteRole = "deleteRole" {
        guild_id: Option<String> = "guildId",
        role_id: String = "roleId",
        reason: Option<String> = "reason",
    }
    AssignRole = "assignRole" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        role_id: String = "roleId",
        reason: Option<String> = "reason",
    }
    RemoveRole = "removeRole" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        role_id: String = "roleId",
        reason: Option<String> = "reason",
    }
    SetRolePosition = "setRolePosition" {
        guild_id: Option<String> = "guildId",
        role_id: String = "roleId",
        position: String = "position",
    }
    ListRoles = "listRoles" {
        guild_id: Option<String> = "guildId",
    }

    // ----- Members -----
    GetMemberInfo = "getMemberInfo" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
    }
    ListMembers = "listMembers" {
        guild_id: Option<String> = "guildId",
        count: Option<String> = "count",
    }
    KickMember = "kickMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        reason: Option<String> = "reason",
    }
    BanMember = "banMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        reason: Option<String> = "reason",
        delete_message_days: Option<String> = "deleteMessageDays",
    }
    UnbanMember = "unbanMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        reason: Option<String> = "reason",
    }
    TimeoutMember = "timeoutMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        duration: Option<String> = "duration",
        reason: Option<String> = "reason",
    }
    SetNickname = "setNickname" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        nickname: Option<String> = "nickname",
    }
    ListBans = "listBans" {
        guild_id: Option<String> = "guildId",
    }

    // ----- Voice -----
    MoveMember = "moveMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
        channel_id: String = "channelId",
    }
    DisconnectMember = "disconnectMember" {
        guild_id: Option<String> = "guildId",
        user_id: String = "userId",
    }
    JoinVoice = "joinVoice" {
        channel_id: String = "channelId",
    }
    LeaveVoice = "leaveVoice" {
        guild_id: Option<String> = "guildId",
    }
    SetVoiceVolume = "setVoiceVolume" {
        guild_id: Option<String> = "guildId",
        volume: String = "volume",
    }

    // ----- Threads -----
    CreateThread = "createThread" {
        channel_id: String = "channelId",
        name: String = "name",
        message_id: Option<String> = "messageId",
        auto_archive_duration: Option<String> = "autoArchiveDuration",
    }
    ArchiveThread = "archiveThread" {
        thread_id: String = "threadId",
    }
    LockThread = "lockThread" {
        thread_id: String = "threadId",
    }
    AddThreadMember = "addThreadMember" {
        thread_id: String = "threadId",
        user_id: String = "userId",
    }
    ListActiveThreads = "listActiveThreads" {
        guild_id: Option<String> = "guildId",
    }

    // ----- Webhooks -----
    CreateWebhook = "createWebhook" {
        channel_id: String = "channelId",
        name: String = "name",
        avatar_url: Option<String> = "avatarUrl",
    }
    SendWebhookMessage = "sendWebhookMessage" {
        webhook_id: String = "webhookId",
        webhook_token: String = "webhookToken",
        message: String = "message",
        username: Option<String> = "username",
        avatar_url: Option<String> = "avatarUrl",
    }
    DeleteWebhook = "deleteWebhook" {
        webhook_id: String = "webhookId",
    }
    ListWebhooks = "listWebhooks" {
        channel_id: String = "channelId",
    }

    // ----- Invites -----
    CreateInvite = "createInvite" {
        channel_id: String = "channelId",
        max_age: Option<String> = "maxAge",
        max_uses: Option<String> = "maxUses",
        temporary: Option<bool> = "temporary",
    }
    DeleteInvite = "deleteInvite" {
        code: String = "code",
    }
    ListInvites = "listInvites" {
        guild_id: Option<String> = "guildId",
    }

    // ----- Emojis -----
    CreateEmoji = "createEmoji" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        image_url: String = "imageUrl",
    }
    DeleteEmoji = "deleteEmoji" {
        guild_id: Option<String> = "guildId",
        emoji_id: String = "emojiId",
    }
    ListEmojis = "listEmojis" {
        guild_id: Option<String> = "guildId",
    }

    // ----- Scheduled events -----
    CreateEvent = "createEvent" {
        guild_id: Option<String> = "guildId",
        name: String = "name",
        description: Option<String> = "description",
        start_time: String = "startTime",
        end_time: Option<String> = "endTime",
        location: Option<String> = "location",
        channel_id: Option<String> = "channelId",
    }
    DeleteEvent = "deleteEvent" {
        guild_id: Option<String> = "guildId",
        event_id: String = "eventId",
    }
    ListEvents = "listEvents" {
        guild_id: Option<String> = "guildId",
    }
}

impl OperationKind {
    /// Looks up an operation by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Returns true if the declared argument order contains `key`.
    #[must_use]
    pub fn accepts(self, key: &str) -> bool {
        self.arg_order().contains(&key)
    }

    /// Human-readable signature, e.g. `sendMessage(channelId, message)`.
    #[must_use]
    pub fn signature(self) -> String {
        format!("{}({})", self.name(), self.arg_order().join(", "))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Operation {
    /// Wire name of the bound operation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
