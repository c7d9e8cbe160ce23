//! Self-installation to a binary directory.

use banter_core::AppResult;
use std::path::Path;

const INSTALL_DIR: &str = "/usr/local/bin";

/// Copy the running executable to the install directory.
///
/// Permission failures are reported, not fatal: the command prints the
/// error and returns Ok so the process still exits cleanly.
pub fn execute() -> AppResult<()> {
    let source = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            println!("Could not locate the running executable: {}", e);
            return Ok(());
        }
    };

    let target = Path::new(INSTALL_DIR).join("banter");

    if let Err(e) = install_to(&source, &target) {
        println!("Could not install to {}: {}", target.display(), e);
        return Ok(());
    }

    println!("Installed banter at {}", target.display());
    Ok(())
}

fn install_to(source: &Path, target: &Path) -> std::io::Result<()> {
    std::fs::copy(source, target)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(target, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}
