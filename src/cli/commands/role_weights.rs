//! Role weight command handlers

use crate::config::Config;
use crate::domain::{Role, RoleWeights};
use crate::state::SharedState;

pub async fn cmd_role_weights_show(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let weights = state.analytics_service.role_weights().await?;

    println!("Role Weights");
    print_weights(&weights);
    Ok(())
}

pub async fn cmd_role_weights_reset(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let weights = state.analytics_service.reset_role_weights().await?;

    println!("✓ Role weights reset to defaults; weighted scores refreshed.");
    print_weights(&weights);
    Ok(())
}

fn print_weights(weights: &RoleWeights) {
    let defaults = RoleWeights::defaults();
    println!("{:-<70}", "");
    println!("{:<16} {:>8} {:>8}", "Role", "Weight", "Default");

    for role in Role::ALL {
        let weight = weights.get(role);
        let default = defaults.get(role);
        let marker = if (weight - default).abs() > f64::EPSILON {
            " *"
        } else {
            ""
        };
        println!("{:<16} {weight:>8.2} {default:>8.2}{marker}", role.as_str());
    }
}
