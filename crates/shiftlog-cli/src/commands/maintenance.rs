use shiftlog_core::JournalBackend;

use crate::app::AppContext;
use crate::constants::exit_codes;

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let session = ctx.open_session()?;
    let result = session
        .store
        .with_backend(|backend| backend.check_integrity());
    match result {
        Ok(()) => {
            let metadata = session.store.with_backend(|backend| backend.metadata())?;
            if !ctx.quiet() {
                println!("Integrity check: OK");
                println!("- foreign keys: OK");
                println!("- metadata keys: OK");
                println!("- cancellation fields: OK");
                println!("- format version: {}", metadata.format_version);
                println!("- entries: {}", session.store.len()?);
            }
        }
        Err(err) => {
            eprintln!("Integrity check: FAILED");
            eprintln!("- error: {}", err);
            eprintln!("Hint: Restore the journal from a backup before retrying.");
            std::process::exit(exit_codes::INTEGRITY_FAILED);
        }
    }
    Ok(())
}
