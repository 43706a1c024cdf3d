//! Static table of gateway operations.
//!
//! Every operation maps to one HTTP verb, one path template and one rate-limit
//! class. `{instance}` in a template is replaced by the target instance name.

use crate::error::{GatewayError, Result};
use crate::http::request::HttpMethod;
use crate::routing::OperationClass;

/// Verb, path template and rate-limit class of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub operation: Operation,
    pub method: HttpMethod,
    pub path: &'static str,
    pub class: OperationClass,
}

impl OperationSpec {
    /// Whether the path addresses a single instance.
    pub fn is_instance_scoped(&self) -> bool {
        self.path.contains("{instance}")
    }

    /// Render the path for `instance`.
    pub fn render(&self, instance: Option<&str>) -> Result<String> {
        if !self.is_instance_scoped() {
            return Ok(self.path.to_string());
        }
        let instance = instance.ok_or_else(|| {
            GatewayError::Configuration(format!("{:?} requires an instance name", self.operation))
        })?;
        if instance.is_empty() || instance.contains(['/', '?', '#']) {
            return Err(GatewayError::Configuration(format!(
                "invalid instance name '{}'",
                instance
            )));
        }
        Ok(self.path.replace("{instance}", instance))
    }

    /// Instance named by `endpoint` if it is a rendering of this template.
    pub fn match_instance<'a>(&self, endpoint: &'a str) -> Option<&'a str> {
        let prefix = self.path.strip_suffix("{instance}")?.trim_start_matches('/');
        let instance = endpoint.strip_prefix(prefix)?;
        (!instance.is_empty() && !instance.contains('/')).then_some(instance)
    }
}

/// Instance addressed by a raw endpoint path, if it matches an instance-scoped
/// operation. Query string and surrounding slashes are ignored.
pub fn instance_from_endpoint(endpoint: &str) -> Option<&str> {
    let path = endpoint.split(['?', '#']).next().unwrap_or_default().trim_matches('/');
    OPERATIONS.iter().find_map(|spec| spec.match_instance(path))
}

/// Gateway operations known to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    // Instances
    CreateInstance,
    FetchInstances,
    ConnectInstance,
    RestartInstance,
    ConnectionState,
    LogoutInstance,
    DeleteInstance,
    SetPresence,
    // Messages
    SendText,
    SendMedia,
    SendAudio,
    SendSticker,
    SendStatus,
    SendLocation,
    SendContact,
    SendReaction,
    SendPoll,
    SendList,
    SendButtons,
    // Chats
    CheckWhatsAppNumbers,
    MarkMessageAsRead,
    ArchiveChat,
    DeleteMessageForEveryone,
    SendChatPresence,
    FindContacts,
    FindMessages,
    FindChats,
    FetchProfilePictureUrl,
    GetBase64FromMediaMessage,
    // Profile
    FetchProfile,
    UpdateProfileName,
    UpdateProfileStatus,
    UpdateProfilePicture,
    RemoveProfilePicture,
    FetchPrivacySettings,
    // Groups
    CreateGroup,
    FetchAllGroups,
    FindGroupInfo,
    GroupParticipants,
    UpdateGroupParticipants,
    UpdateGroupSubject,
    UpdateGroupDescription,
    GroupInviteCode,
    LeaveGroup,
    // Webhook & settings
    SetWebhook,
    FindWebhook,
    SetSettings,
    FindSettings,
}

macro_rules! op {
    ($op:ident, $method:ident, $path:literal, $class:ident) => {
        OperationSpec {
            operation: Operation::$op,
            method: HttpMethod::$method,
            path: $path,
            class: OperationClass::$class,
        }
    };
}

/// Indexed by `Operation as usize`; order must follow the enum.
pub const OPERATIONS: &[OperationSpec] = &[
    op!(CreateInstance, Post, "/instance/create", Instances),
    op!(FetchInstances, Get, "/instance/fetchInstances", Instances),
    op!(ConnectInstance, Get, "/instance/connect/{instance}", Instances),
    op!(RestartInstance, Put, "/instance/restart/{instance}", Instances),
    op!(ConnectionState, Get, "/instance/connectionState/{instance}", Instances),
    op!(LogoutInstance, Delete, "/instance/logout/{instance}", Instances),
    op!(DeleteInstance, Delete, "/instance/delete/{instance}", Instances),
    op!(SetPresence, Post, "/instance/setPresence/{instance}", Instances),
    op!(SendText, Post, "/message/sendText/{instance}", Messages),
    op!(SendMedia, Post, "/message/sendMedia/{instance}", Media),
    op!(SendAudio, Post, "/message/sendWhatsAppAudio/{instance}", Media),
    op!(SendSticker, Post, "/message/sendSticker/{instance}", Media),
    op!(SendStatus, Post, "/message/sendStatus/{instance}", Media),
    op!(SendLocation, Post, "/message/sendLocation/{instance}", Messages),
    op!(SendContact, Post, "/message/sendContact/{instance}", Messages),
    op!(SendReaction, Post, "/message/sendReaction/{instance}", Messages),
    op!(SendPoll, Post, "/message/sendPoll/{instance}", Messages),
    op!(SendList, Post, "/message/sendList/{instance}", Messages),
    op!(SendButtons, Post, "/message/sendButtons/{instance}", Messages),
    op!(CheckWhatsAppNumbers, Post, "/chat/whatsappNumbers/{instance}", Chats),
    op!(MarkMessageAsRead, Post, "/chat/markMessageAsRead/{instance}", Chats),
    op!(ArchiveChat, Post, "/chat/archiveChat/{instance}", Chats),
    op!(DeleteMessageForEveryone, Delete, "/chat/deleteMessageForEveryone/{instance}", Chats),
    op!(SendChatPresence, Post, "/chat/sendPresence/{instance}", Chats),
    op!(FindContacts, Post, "/chat/findContacts/{instance}", Chats),
    op!(FindMessages, Post, "/chat/findMessages/{instance}", Chats),
    op!(FindChats, Post, "/chat/findChats/{instance}", Chats),
    op!(FetchProfilePictureUrl, Post, "/chat/fetchProfilePictureUrl/{instance}", Chats),
    op!(GetBase64FromMediaMessage, Post, "/chat/getBase64FromMediaMessage/{instance}", Media),
    op!(FetchProfile, Post, "/chat/fetchProfile/{instance}", Default),
    op!(UpdateProfileName, Post, "/chat/updateProfileName/{instance}", Default),
    op!(UpdateProfileStatus, Post, "/chat/updateProfileStatus/{instance}", Default),
    op!(UpdateProfilePicture, Post, "/chat/updateProfilePicture/{instance}", Media),
    op!(RemoveProfilePicture, Delete, "/chat/removeProfilePicture/{instance}", Default),
    op!(FetchPrivacySettings, Get, "/chat/fetchPrivacySettings/{instance}", Default),
    op!(CreateGroup, Post, "/group/create/{instance}", Groups),
    op!(FetchAllGroups, Get, "/group/fetchAllGroups/{instance}", Groups),
    op!(FindGroupInfo, Get, "/group/findGroupInfos/{instance}", Groups),
    op!(GroupParticipants, Get, "/group/participants/{instance}", Groups),
    op!(UpdateGroupParticipants, Post, "/group/updateParticipant/{instance}", Groups),
    op!(UpdateGroupSubject, Post, "/group/updateGroupSubject/{instance}", Groups),
    op!(UpdateGroupDescription, Post, "/group/updateGroupDescription/{instance}", Groups),
    op!(GroupInviteCode, Get, "/group/inviteCode/{instance}", Groups),
    op!(LeaveGroup, Delete, "/group/leaveGroup/{instance}", Groups),
    op!(SetWebhook, Post, "/webhook/set/{instance}", Default),
    op!(FindWebhook, Get, "/webhook/find/{instance}", Default),
    op!(SetSettings, Post, "/settings/set/{instance}", Default),
    op!(FindSettings, Get, "/settings/find/{instance}", Default),
];

impl Operation {
    /// Table entry for this operation.
    pub fn spec(self) -> &'static OperationSpec {
        &OPERATIONS[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::classify_endpoint;

    #[test]
    fn test_table_order_matches_enum() {
        for (i, spec) in OPERATIONS.iter().enumerate() {
            assert_eq!(spec.operation as usize, i, "{:?} is out of place", spec.operation);
            assert_eq!(spec.operation.spec(), spec);
        }
    }

    #[test]
    fn test_table_agrees_with_prefix_matcher() {
        for spec in OPERATIONS {
            // Profile endpoints live under /chat but are limited as "default"
            if spec.class == OperationClass::Default && spec.path.starts_with("/chat/") {
                continue;
            }
            assert_eq!(classify_endpoint(spec.path), spec.class, "{:?}", spec.operation);
        }
    }

    #[test]
    fn test_render() {
        let spec = Operation::SendText.spec();
        assert_eq!(spec.method, HttpMethod::Post);
        assert_eq!(spec.render(Some("sales")).unwrap(), "/message/sendText/sales");
        assert!(spec.render(None).is_err());
        assert!(spec.render(Some("a/b")).is_err());

        let spec = Operation::FetchInstances.spec();
        assert!(!spec.is_instance_scoped());
        assert_eq!(spec.render(None).unwrap(), "/instance/fetchInstances");
    }

    #[test]
    fn test_instance_from_endpoint() {
        assert_eq!(instance_from_endpoint("/instance/connectionState/main"), Some("main"));
        assert_eq!(instance_from_endpoint("message/sendText/sales/"), Some("sales"));
        assert_eq!(instance_from_endpoint("/chat/findChats/main?limit=10"), Some("main"));
        assert_eq!(instance_from_endpoint("/instance/fetchInstances"), None);
        assert_eq!(instance_from_endpoint("/instance/connect/"), None);
        assert_eq!(instance_from_endpoint("/instance/connect/a/b"), None);
        assert_eq!(instance_from_endpoint("/custom/thing/main"), None);
    }
}
