//! Declare a serverless reboot-and-notify topology for an EC2 instance.
//!
//! `reboot-stack` reads a JSON deployment configuration and produces a typed
//! resource-declaration graph: an execution role with a baseline managed policy
//! and explicit reboot/publish grants, a Lambda function cross-compiled from a
//! separate Go program, descriptive outputs, and (when an alarm is configured)
//! a CloudWatch alarm invoke permission. The graph is serialized for an
//! external provisioning engine; this crate never calls the cloud control
//! plane itself.

pub mod aws;
