//! Recognition of package-manager script invocations
//!
//! `npm run lint`, `pnpm build`, `yarn test` and `bun run dev` all run a
//! script from `package.json`. Package-manager subcommands such as `install`
//! or `add` are not scripts and are never probed.

use serde::Serialize;

use super::is_env_assignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

const PNPM_BUILTINS: &[&str] = &[
    "add", "audit", "bin", "config", "create", "deploy", "dlx", "doctor", "env", "exec",
    "fetch", "help", "i", "import", "init", "install", "install-test", "licenses", "link",
    "list", "ls", "outdated", "pack", "patch", "patch-commit", "prune", "publish", "rebuild",
    "remove", "rm", "root", "server", "setup", "store", "uninstall", "unlink", "up", "update",
    "why",
];

const YARN_BUILTINS: &[&str] = &[
    "add", "audit", "bin", "cache", "config", "create", "dedupe", "dlx", "exec", "explain",
    "global", "help", "import", "info", "init", "install", "licenses", "link", "list",
    "login", "logout", "node", "npm", "outdated", "owner", "pack", "plugin", "publish",
    "rebuild", "remove", "set", "tag", "team", "unlink", "unplug", "up", "upgrade",
    "upgrade-interactive", "version", "why", "workspace", "workspaces",
];

const BUN_BUILTINS: &[&str] = &[
    "a", "add", "build", "create", "exec", "help", "i", "init", "install", "link", "outdated",
    "patch", "pm", "publish", "remove", "repl", "rm", "test", "unlink", "update", "upgrade",
    "x",
];

/// npm subcommands that run the script of the same name
const NPM_LIFECYCLE: &[&str] = &["test", "start", "stop", "restart"];

/// npm subcommands that take the script name as the next argument
const NPM_RUN: &[&str] = &["run", "run-script"];

impl PackageManager {
    pub fn from_executable(name: &str) -> Option<Self> {
        match name {
            "npm" => Some(PackageManager::Npm),
            "pnpm" => Some(PackageManager::Pnpm),
            "yarn" => Some(PackageManager::Yarn),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    fn is_builtin(&self, subcommand: &str) -> bool {
        match self {
            PackageManager::Npm => !NPM_LIFECYCLE.contains(&subcommand),
            PackageManager::Pnpm => PNPM_BUILTINS.contains(&subcommand),
            PackageManager::Yarn => YARN_BUILTINS.contains(&subcommand),
            PackageManager::Bun => BUN_BUILTINS.contains(&subcommand),
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A command that runs a `package.json` script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptInvocation {
    pub manager: PackageManager,
    pub script: String,
}

/// Recognize a package-manager script invocation at the start of `command`
pub fn script_invocation(command: &str) -> Option<ScriptInvocation> {
    let mut tokens = command
        .split_whitespace()
        .skip_while(|token| is_env_assignment(token));

    let manager = PackageManager::from_executable(tokens.next()?)?;
    let subcommand = tokens.next()?;

    // Leading flags (`pnpm -C dir build`) make the script position ambiguous
    if subcommand.starts_with('-') {
        return None;
    }

    let takes_script_arg = NPM_RUN.contains(&subcommand)
        || (manager != PackageManager::Npm && subcommand == "run");

    let script = if takes_script_arg {
        tokens.find(|token| !token.starts_with('-'))?
    } else if manager.is_builtin(subcommand) {
        return None;
    } else if manager == PackageManager::Bun && looks_like_file(subcommand) {
        // `bun index.ts` runs a file, not a script
        return None;
    } else {
        subcommand
    };

    Some(ScriptInvocation {
        manager,
        script: script.to_string(),
    })
}

fn looks_like_file(token: &str) -> bool {
    token.contains('/') || token.contains('.')
}
