/// AWS services integration.
///
/// - `dynamodb`: session and user tables
/// - `ses`: escalation mail
/// - `ssm`: secret parameters
pub mod dynamodb;
pub mod ses;
pub mod ssm;

pub use dynamodb::{DynamoSessionStore, DynamoUserStore};
pub use ses::SesMailer;
pub use ssm::SsmSecretStore;
