use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use log::info;
use reqwest::Method;

use apiwire::{
    AclClient, AclConfig, ActionConfiguration, BodyArtifact, BodyCodec, CodecConfig, Group, Principal,
    PrincipalStore, Property,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL the action is sent to
    #[arg(long, default_value = "https://httpbin.org/anything")]
    url: String,

    /// HTTP method
    #[arg(long, default_value = "POST")]
    method: String,

    /// Content type of the request body
    #[arg(long, default_value = "multipart/form-data")]
    content_type: String,

    /// Policy service host; access checks are skipped when absent
    #[arg(long)]
    policy_host: Option<String>,

    /// Policy package path
    #[arg(long, default_value = "/v1/data/apiwire/authz")]
    policy_package: String,

    /// Block size for streamed file parts
    #[arg(long, default_value = "4096")]
    chunk_size: usize,
}

/// Store with a fixed principal that belongs to a single group.
struct StaticStore;

#[async_trait]
impl PrincipalStore for StaticStore {
    async fn current_principal(&self) -> Result<Principal> {
        Ok(Principal::new("demo-user")
            .with_permissions(["pages:read"])
            .with_groups(["editors"]))
    }

    async fn group_by_id(&self, group_id: &str) -> Result<Group> {
        Ok(Group::new(group_id, ["pages:write"]))
    }
}

fn demo_action() -> ActionConfiguration {
    ActionConfiguration::default()
        .with_body(r#"{"title": "Quarterly report", "draft": true}"#)
        .with_body_form_data(vec![
            Property::new("title", "Quarterly report").with_type("TEXT"),
            Property::new("tags", r#"["finance", "q3"]"#).with_type("ARRAY"),
            Property::new(
                "attachment",
                r#"{"name": "notes.txt", "type": "text/plain", "data": "numbers look good"}"#,
            )
            .with_type("FILE"),
        ])
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let method: Method = args.method.parse()?;
    info!("Sending {method} {} as {}", args.url, args.content_type);

    if let Some(host) = args.policy_host {
        let acl = AclClient::new(
            AclConfig::new(host, args.policy_package),
            Arc::new(StaticStore),
        )?;
        let resource = reqwest::Url::parse(&args.url)?.path().to_string();
        let verdict = acl.evaluate(&method, &resource).await?;
        if !verdict.is_allowed() {
            anyhow::bail!("Access to {method} {resource} denied");
        }
        info!("Access granted");
    }

    let codec = BodyCodec::new(CodecConfig::builder().file_chunk_size(args.chunk_size).build());
    let artifact = codec.resolve(&demo_action(), &args.content_type, &method, true)?;

    let client = reqwest::Client::new();
    let mut request = client.request(method, &args.url);
    // multipart bodies set their own boundary header
    if !matches!(artifact, BodyArtifact::Multipart(_)) {
        request = request.header(reqwest::header::CONTENT_TYPE, &args.content_type);
    }
    let response = artifact.attach(request)?.send().await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or_default();
    info!("Response status: {status}");
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
