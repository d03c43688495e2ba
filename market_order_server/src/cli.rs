use std::{env, env::VarError};

/// There's no real CLI for the server. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // MOS_SNAP_SERVER_KEY is deliberately absent
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "MOS_HOST",
        "MOS_PORT",
        "MOS_DATABASE_URL",
        "MOS_DB_MAX_CONNECTIONS",
        "MOS_USER_ID_HEADER",
        "MOS_SNAP_BASE_URL",
        "MOS_SNAP_TIMEOUT_SECS",
        "MOS_VERIFY_WEBHOOK_SIGNATURE",
        "MOS_ORPHAN_CHECK_INTERVAL_SECS",
        "MOS_ORPHAN_AGE_MINUTES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
