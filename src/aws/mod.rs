use aws_config::BehaviorVersion;
use serde::Deserialize;
use std::{env, fs::File, path::Path};

mod bundle;
pub use bundle::bundle;
mod synth;
pub use synth::{declare, synth, Format};
pub mod template;

pub const SYNTH_CMD: &str = "synth";
pub const BUNDLE_CMD: &str = "bundle";

/// Default path of the deployment configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Environment variable naming the target account
pub const ACCOUNT_ENV: &str = "AWS_ACCOUNT_ID";

/// Environment variable naming the target region
pub const REGION_ENV: &str = "AWS_REGION";

/// Name of the declared stack
pub const STACK_NAME: &str = "reboot-notify";

/// Service principal allowed to assume the execution role
pub const LAMBDA_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";

/// Service principal CloudWatch alarms invoke the function as
pub const ALARM_SERVICE_PRINCIPAL: &str = "lambda.alarms.cloudwatch.amazonaws.com";

/// Baseline managed policy granting log delivery rights
pub const BASIC_EXECUTION_POLICY: &str = "service-role/AWSLambdaBasicExecutionRole";

/// Action allowing the function to reboot instances
pub const REBOOT_ACTION: &str = "ec2:RebootInstances";

/// Action allowing the function to publish notifications
pub const PUBLISH_ACTION: &str = "sns:Publish";

/// Action granted to the alarm principal on the function
pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";

/// Managed runtime of the deployed function
pub const FUNCTION_RUNTIME: &str = "provided.al2";

/// Entry point artifact within the deployment package
pub const FUNCTION_HANDLER: &str = "bootstrap";

/// Directory containing the function source, relative to the repository root
pub const FUNCTION_SOURCE: &str = "lambda";

/// Execution time limit of the deployed function, in seconds
pub const FUNCTION_TIMEOUT_SECS: u64 = 30;

/// Description attached to the function declaration
pub const FUNCTION_DESCRIPTION: &str =
    "Lambda function to reboot an EC2 instance and notify via SNS";

/// Build container image used to cross-compile the artifact
pub const BUILD_IMAGE: &str = "public.ecr.aws/sam/build-provided.al2";

/// Command run inside the build container
pub const BUILD_COMMAND: &str =
    "GOOS=linux GOARCH=amd64 go build -o /asset-output/bootstrap main.go";

/// User the build container runs as
pub const BUILD_USER: &str = "root";

/// Logical id of the execution role
pub const ROLE_ID: &str = "LambdaExecutionRole";

/// Logical id of the reboot function
pub const FUNCTION_ID: &str = "RebootEc2LambdaFunction";

/// Logical id of the alarm invoke permission
pub const PERMISSION_ID: &str = "CloudwatchAlarmInvokePermission";

/// Output key exposing the deployed function name
pub const FUNCTION_NAME_OUTPUT: &str = "LambdaFunctionName";

/// Output key exposing the deployed function ARN
pub const FUNCTION_ARN_OUTPUT: &str = "LambdaFunctionArn";

/// Output key exposing the alarm ARN allowed to invoke the function
pub const ALARM_ARN_OUTPUT: &str = "CloudwatchAlarmArn";

/// Output key confirming the alarm invoke permission
pub const ALARM_PERMISSION_OUTPUT: &str = "CloudwatchAlarmPermission";

/// Confirmation message emitted when the alarm branch is declared
pub const ALARM_CONFIRMATION: &str = "CloudWatch alarm invoke permission granted";

/// Environment variable injected into the function naming the reboot target
pub const INSTANCE_ID_VAR: &str = "INSTANCE_ID";

/// Environment variable injected into the function naming the notification topic
pub const SNS_TOPIC_ARN_VAR: &str = "SNS_TOPIC_ARN";

/// Errors that abort a declaration pass.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("template rendering failed: {0}")]
    Template(#[from] serde_yaml::Error),
    #[error("environment variable {0} is not set")]
    MissingEnvironment(&'static str),
    #[error("artifact build exited with {0}")]
    BuildFailed(std::process::ExitStatus),
}

/// Deployment configuration read from the JSON config file.
///
/// All fields are trusted, pre-validated strings supplied by the operator.
/// Absent string fields deserialize to empty strings and propagate into the
/// declaration rather than being rejected; an absent alarm name disables the
/// alarm-invoke branch. Unrecognized keys are ignored.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Compute instance the function reboots.
    #[serde(default)]
    pub instance_id: String,
    /// Notification topic the function publishes to.
    #[serde(default)]
    pub sns_topic_arn: String,
    /// Monitoring alarm allowed to invoke the function.
    #[serde(default)]
    pub cloudwatch_alarm_name: Option<String>,
}

impl Config {
    /// Loads the configuration from a JSON file.
    ///
    /// A missing or malformed file aborts the declaration pass before any
    /// resource is declared.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Target deployment environment the declaration is parameterized by.
#[derive(Clone, Debug)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    /// Resolves the target environment from the process environment.
    ///
    /// The account comes from [ACCOUNT_ENV]. The region comes from
    /// [REGION_ENV], falling back to the standard AWS provider chain
    /// (profile configuration) when the variable is unset.
    pub async fn resolve() -> Result<Self, Error> {
        let account = env::var(ACCOUNT_ENV).map_err(|_| Error::MissingEnvironment(ACCOUNT_ENV))?;
        let region = match env::var(REGION_ENV) {
            Ok(region) if !region.is_empty() => region,
            _ => {
                let config = aws_config::defaults(BehaviorVersion::v2025_01_17())
                    .load()
                    .await;
                config
                    .region()
                    .map(|region| region.to_string())
                    .ok_or(Error::MissingEnvironment(REGION_ENV))?
            }
        };
        Ok(Self { account, region })
    }
}

/// Fully-qualified identifier of a monitoring alarm within an account/region.
pub fn alarm_arn(region: &str, account: &str, name: &str) -> String {
    format!("arn:aws:cloudwatch:{region}:{account}:alarm:{name}")
}
