//! Endpoint → operation class matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive, leading slash optional
//! - Query strings are ignored
//! - Unmatched endpoints fall into the "default" class

use crate::routing::OperationClass;

/// Ordered prefix table; the first match wins, so specific prefixes come first.
const CLASS_PREFIXES: &[(&str, OperationClass)] = &[
    ("message/sendMedia", OperationClass::Media),
    ("message/sendWhatsAppAudio", OperationClass::Media),
    ("message/sendSticker", OperationClass::Media),
    ("message/sendStatus", OperationClass::Media),
    ("chat/getBase64FromMediaMessage", OperationClass::Media),
    ("chat/updateProfilePicture", OperationClass::Media),
    ("message/", OperationClass::Messages),
    ("instance/", OperationClass::Instances),
    ("group/", OperationClass::Groups),
    ("chat/", OperationClass::Chats),
];

/// Operation class for a raw endpoint path.
pub fn classify_endpoint(endpoint: &str) -> OperationClass {
    let path = endpoint.trim_start_matches('/');
    let path = path.split(['?', '#']).next().unwrap_or(path);

    CLASS_PREFIXES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, class)| *class)
        .unwrap_or(OperationClass::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_classes() {
        assert_eq!(classify_endpoint("/message/sendText/inst"), OperationClass::Messages);
        assert_eq!(classify_endpoint("message/sendMedia/inst"), OperationClass::Media);
        assert_eq!(classify_endpoint("/instance/connect/inst"), OperationClass::Instances);
        assert_eq!(classify_endpoint("/group/fetchAllGroups/inst?getParticipants=true"), OperationClass::Groups);
        assert_eq!(classify_endpoint("/chat/findChats/inst"), OperationClass::Chats);
        assert_eq!(classify_endpoint("/chat/getBase64FromMediaMessage/inst"), OperationClass::Media);
    }

    #[test]
    fn test_unmatched_is_default() {
        assert_eq!(classify_endpoint("/webhook/set/inst"), OperationClass::Default);
        assert_eq!(classify_endpoint(""), OperationClass::Default);
        // Case-sensitive
        assert_eq!(classify_endpoint("/Message/sendText/inst"), OperationClass::Default);
    }
}
