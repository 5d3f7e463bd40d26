use shiftlog_core::{Identity, ShiftlogError};

use crate::app::{AppContext, IdentitySource};
use crate::cli::LoginArgs;
use crate::shell::prompts;
use crate::ui::{hint, kv, print, receipt};

pub fn handle_login(ctx: &AppContext, args: &LoginArgs) -> anyhow::Result<()> {
    let name = match (args.name.clone(), ctx.interactive()) {
        (Some(name), _) => name,
        (None, true) => prompts::input_text("Operator name")?,
        (None, false) => {
            return Err(ShiftlogError::Validation("Operator name is required".to_string()).into())
        }
    };

    let mut identity = ctx.identity();
    identity.sign_in(&name)?;

    if !ctx.quiet() {
        let ui = ctx.ui_context(false, None);
        let operator = identity.display_name().unwrap_or_default().to_string();
        print(
            &ui,
            &receipt(&ui, "Signed in", &[("Operator", operator.as_str())]),
        );
        if ctx.cli().user.is_some() {
            print(
                &ui,
                &hint(&ui, "--user/SHIFTLOG_USER still overrides this name"),
            );
        }
    }
    Ok(())
}

pub fn handle_logout(ctx: &AppContext) -> anyhow::Result<()> {
    let mut identity = ctx.identity();
    let previous = identity.display_name().map(str::to_string);
    identity.sign_out()?;

    if !ctx.quiet() {
        let ui = ctx.ui_context(false, None);
        match previous {
            Some(name) => print(&ui, &format!("Signed out {}.", name)),
            None => print(&ui, "No operator was signed in."),
        }
    }
    Ok(())
}

pub fn handle_whoami(ctx: &AppContext) -> anyhow::Result<()> {
    let identity = ctx.identity();
    let name = identity.require_name()?;
    let ui = ctx.ui_context(false, None);
    if ctx.quiet() || !ui.mode.is_pretty() {
        println!("{}", name);
        return Ok(());
    }
    let source = match identity.source() {
        IdentitySource::Override => "--user / SHIFTLOG_USER",
        IdentitySource::Config => "config",
        IdentitySource::None => "none",
    };
    println!("{}", kv(&ui, "Operator", name));
    println!("{}", kv(&ui, "Source", source));
    Ok(())
}
