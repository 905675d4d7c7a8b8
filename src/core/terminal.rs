use console::{Emoji, style};

static READY: Emoji<'_, '_> = Emoji("✅ ", "");
static FAILED: Emoji<'_, '_> = Emoji("❌ ", "");

pub fn print_error(msg: &str) {
    eprintln!("{}{}", FAILED, style(msg).red().bold());
}

/// What the operator needs to reach and recognise a running HMI.
pub struct StartupSummary<'a> {
    pub variant: &'a str,
    pub simulation: &'a str,
    pub ingress: &'a str,
    pub base_url: &'a str,
}

pub fn print_startup_summary(summary: &StartupSummary<'_>) {
    println!("{}{}", READY, style("HMI service is up").green());
    let rows = [
        ("Variant", style(summary.variant).bold()),
        ("Simulation", style(summary.simulation).bold()),
        ("Executive via", style(summary.ingress)),
        ("Base URL", style(summary.base_url).underlined().cyan()),
    ];
    for (label, value) in rows {
        println!("  {:<14} {}", style(label).dim(), value);
    }
}

pub fn print_usage() {
    println!(
        "\n {} {} [flags]\n",
        style("Usage:").bold(),
        style("executive-hmi").green()
    );
    let flags: &[(&str, &str)] = &[
        ("--runtime-context-path <path>", "Runtime context file (TOML or .json)"),
        ("--base-url-fmt <fmt>", "Base URL format, exactly one %s for the service name"),
        ("--ingress-address <addr>", "Address used to reach the executive and solution services"),
        ("--variant static|catalog", "Where processes come from"),
        ("--processes-dir <path>", "Directory of exported processes (static variant)"),
        ("--frontend-dir <path>", "Directory holding index.html and static assets"),
        ("--simulation-mode draft|reality", "Override the variant's simulation mode"),
        ("--request-timeout-secs <n>", "Timeout for every backend call"),
        ("--exclusive-start", "Serialize concurrent starts inside this process"),
        ("--log-level <level>", "trace, debug, info, warn or error"),
    ];
    for (flag, help) in flags {
        println!("  {:<34} {}", style(flag).cyan(), help);
    }
    println!();
}
