/// Infrastructure layer for external integrations.
///
/// This module contains the AWS-backed implementations of the storage and
/// secret seams declared in `core::store`:
/// - `DynamoDB` session and user tables
/// - SSM Parameter Store secrets
/// - SES mail for escalations
pub mod aws;
