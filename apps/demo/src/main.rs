//! Demo Entry Point
//!
//! Walks the account flow end to end against the in-process provider, a
//! scripted biometric device and a JSON-file preference store. Uses
//! `anyhow` for startup errors; flow errors are handled where they occur.

use std::sync::Arc;

use authflow::provider::MemoryIdentityProvider;
use authflow::{FlowConfig, SessionController, SignInInput, SignUpInput};
use device::biometric::{Capability, ScriptedBiometric};
use device::prefs::FilePrefs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "demo=info,authflow=info,device=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prefs_path =
        std::env::var("AUTHFLOW_PREFS").unwrap_or_else(|_| "demo-prefs.json".to_string());

    let provider = Arc::new(MemoryIdentityProvider::new());
    let device = Arc::new(ScriptedBiometric::new(Capability::Strong));
    let prefs = Arc::new(FilePrefs::open(&prefs_path).await?);
    tracing::info!(path = %prefs_path, "preference store ready");

    let controller =
        SessionController::new(provider, device, prefs, FlowConfig::default()).await?;
    let snapshots = controller.subscribe();

    // A stale binding from a previous run would belong to an account this
    // fresh provider does not know; start clean
    controller.sign_out(false).await?;

    // Sign up and land authenticated
    let session = controller
        .sign_up(SignUpInput {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        })
        .await?;
    tracing::info!(state = %session.state, "signed up");

    // Opt into biometric re-entry, then sign out keeping the binding
    controller.enable_biometric().await?;
    controller.sign_out(true).await?;
    let ready = controller.biometric_ready().await;
    tracing::info!(ready, "signed out, binding retained");

    // A wrong password is surfaced, not fatal
    if let Err(err) = controller
        .sign_in(SignInInput {
            email: "jane@example.com".to_string(),
            password: "not-the-password".to_string(),
        })
        .await
    {
        tracing::info!(error = %err, "sign-in rejected as expected");
    }

    // Password-less re-entry through the fingerprint prompt
    let session = controller.biometric_reentry().await?;
    tracing::info!(
        state = %session.state,
        email = session.identity.as_ref().map(|i| i.email.as_str()),
        "re-entered with biometrics"
    );

    // Final sign-out, declining to keep the binding
    controller.sign_out(false).await?;
    tracing::info!(state = %snapshots.borrow().state, "done");

    Ok(())
}
