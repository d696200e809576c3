//! Analytics tags for the tokenize flow

/// Closed set of analytics signals for the tokenize flow.
///
/// Exactly one fires per flow invocation, on the terminal path that
/// actually occurred. Emission is a side effect only and never influences
/// the flow's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SepaAnalytics {
    CreateMandateFailed,
    ChallengeCanceled,
    ChallengeFailed,
    TokenizeSucceeded,
}

impl SepaAnalytics {
    /// Stable wire tag reported to the analytics collaborator.
    pub fn tag(&self) -> &'static str {
        match self {
            SepaAnalytics::CreateMandateFailed => "sepa:tokenize:create-mandate:failed",
            SepaAnalytics::ChallengeCanceled => "sepa:tokenize:challenge:canceled",
            SepaAnalytics::ChallengeFailed => "sepa:tokenize:challenge:failed",
            SepaAnalytics::TokenizeSucceeded => "sepa:tokenize:succeeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_unique() {
        let tags = [
            SepaAnalytics::CreateMandateFailed.tag(),
            SepaAnalytics::ChallengeCanceled.tag(),
            SepaAnalytics::ChallengeFailed.tag(),
            SepaAnalytics::TokenizeSucceeded.tag(),
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in tags.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
