//! Inbound reply parsing.
//!
//! Replies arrive as free text over the messaging channel. A recognized
//! reply is one of five keywords, optionally followed by the short
//! reference token quoted from the outbound message. Everything else is
//! logged by the router and ignored by this subsystem (a separate
//! general-purpose chatbot may handle it).

/// A recognized reply keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKeyword {
    /// Family approves a pending time-off request.
    Approve,
    /// Family denies a pending time-off request.
    Deny,
    /// A team member claims an approved open shift.
    Claim,
    /// Family confirms a pending claim.
    Confirm,
    /// Family declines a pending claim.
    Decline,
}

/// A parsed inbound reply: keyword plus optional correlation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReply {
    /// The keyword.
    pub keyword: ReplyKeyword,
    /// Reference token quoted after the keyword, when present.
    /// Normalized to lowercase.
    pub token: Option<String>,
}

impl InboundReply {
    /// Parses raw message text into a reply.
    ///
    /// Matching is case-insensitive and whitespace-tolerant: the text is
    /// trimmed, the first word must be an exact keyword, and an optional
    /// second word is taken as the reference token. Any trailing content
    /// beyond the token makes the message unrecognized (it is likely
    /// conversational text, not a workflow reply).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let keyword = match first.to_ascii_uppercase().as_str() {
            "APPROVE" => ReplyKeyword::Approve,
            "DENY" => ReplyKeyword::Deny,
            "CLAIM" => ReplyKeyword::Claim,
            "CONFIRM" => ReplyKeyword::Confirm,
            "DECLINE" => ReplyKeyword::Decline,
            _ => return None,
        };

        let token = match words.next() {
            Some(word) => {
                if words.next().is_some() {
                    return None;
                }
                if !is_ref_token(word) {
                    return None;
                }
                Some(word.to_ascii_lowercase())
            }
            None => None,
        };

        Some(Self { keyword, token })
    }
}

/// A reference token is exactly 8 hex characters.
fn is_ref_token(word: &str) -> bool {
    word.len() == 8 && word.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_keywords_any_case() {
        for (text, keyword) in [
            ("APPROVE", ReplyKeyword::Approve),
            ("approve", ReplyKeyword::Approve),
            ("  Deny  ", ReplyKeyword::Deny),
            ("claim", ReplyKeyword::Claim),
            ("CONFIRM", ReplyKeyword::Confirm),
            ("\tdecline\n", ReplyKeyword::Decline),
        ] {
            let parsed = InboundReply::parse(text);
            assert_eq!(
                parsed,
                Some(InboundReply {
                    keyword,
                    token: None
                }),
                "failed for {text:?}"
            );
        }
    }

    #[test]
    fn parses_keyword_with_token() {
        let parsed = InboundReply::parse("approve 1A2B3C4D");
        assert_eq!(
            parsed,
            Some(InboundReply {
                keyword: ReplyKeyword::Approve,
                token: Some("1a2b3c4d".to_string()),
            })
        );
    }

    #[test]
    fn rejects_non_keywords() {
        assert_eq!(InboundReply::parse("hello there"), None);
        assert_eq!(InboundReply::parse(""), None);
        assert_eq!(InboundReply::parse("APPROVED"), None);
    }

    #[test]
    fn rejects_malformed_tokens() {
        // Not hex, wrong length, or trailing chatter.
        assert_eq!(InboundReply::parse("claim shift"), None);
        assert_eq!(InboundReply::parse("claim 123"), None);
        assert_eq!(InboundReply::parse("confirm 1a2b3c4d please"), None);
    }
}
