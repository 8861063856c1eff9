//! Built-in toolchain presets
//!
//! Conventional command names: `build`, `test`, `clean`, `format`, `lint`,
//! `check`, `run`, `install`, `ci`. Verbosity variants are written as
//! `<name>:quiet` / `<name>:verbose`.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::{CommandDef, CommandTable, Toolchain};

enum Preset {
    Shell(&'static str),
    Seq(&'static [&'static str]),
    Off,
}

use Preset::{Off, Seq, Shell};

type PresetTable = &'static [(&'static str, Preset)];

const CARGO: PresetTable = &[
    ("build", Shell("cargo build")),
    ("build:quiet", Shell("cargo build --quiet")),
    ("build:verbose", Shell("cargo build --verbose")),
    ("test", Shell("cargo test")),
    ("test:quiet", Shell("cargo test --quiet")),
    ("test:verbose", Shell("cargo test --verbose -- --nocapture")),
    ("clean", Shell("cargo clean")),
    ("format", Shell("cargo fmt")),
    ("lint", Shell("cargo clippy --all-targets")),
    ("check", Shell("cargo check")),
    ("run", Shell("cargo run")),
    ("install", Shell("cargo fetch")),
    ("ci", Seq(&["format", "lint", "test"])),
];

const NPM: PresetTable = &[
    ("install", Shell("npm install")),
    ("build", Shell("npm run build")),
    ("test", Shell("npm test")),
    ("test:quiet", Shell("npm test --silent")),
    ("clean", Shell("npm run clean")),
    ("format", Shell("npm run format")),
    ("lint", Shell("npm run lint")),
    ("check", Shell("npm run typecheck")),
    ("run", Shell("npm start")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const PNPM: PresetTable = &[
    ("install", Shell("pnpm install")),
    ("build", Shell("pnpm build")),
    ("test", Shell("pnpm test")),
    ("test:quiet", Shell("pnpm --silent test")),
    ("clean", Shell("pnpm clean")),
    ("format", Shell("pnpm format")),
    ("lint", Shell("pnpm lint")),
    ("check", Shell("pnpm typecheck")),
    ("run", Shell("pnpm start")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const YARN: PresetTable = &[
    ("install", Shell("yarn install")),
    ("build", Shell("yarn build")),
    ("test", Shell("yarn test")),
    ("clean", Shell("yarn clean")),
    ("format", Shell("yarn format")),
    ("lint", Shell("yarn lint")),
    ("check", Shell("yarn typecheck")),
    ("run", Shell("yarn start")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const BUN: PresetTable = &[
    ("install", Shell("bun install")),
    ("build", Shell("bun run build")),
    ("test", Shell("bun test")),
    ("clean", Shell("bun run clean")),
    ("format", Shell("bun run format")),
    ("lint", Shell("bun run lint")),
    ("check", Shell("bun run typecheck")),
    ("run", Shell("bun run start")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const DENO: PresetTable = &[
    ("build", Shell("deno task build")),
    ("test", Shell("deno test")),
    ("test:quiet", Shell("deno test --quiet")),
    ("clean", Off),
    ("format", Shell("deno fmt")),
    ("lint", Shell("deno lint")),
    ("check", Shell("deno check .")),
    ("run", Shell("deno task start")),
    ("ci", Seq(&["format", "lint", "test"])),
];

const GO: PresetTable = &[
    ("build", Shell("go build ./...")),
    ("build:verbose", Shell("go build -v ./...")),
    ("test", Shell("go test ./...")),
    ("test:verbose", Shell("go test -v ./...")),
    ("clean", Shell("go clean")),
    ("format", Shell("gofmt -w .")),
    ("lint", Shell("go vet ./...")),
    ("check", Shell("go vet ./...")),
    ("run", Shell("go run .")),
    ("install", Shell("go mod download")),
    ("ci", Seq(&["format", "lint", "test"])),
];

const PYTHON: PresetTable = &[
    ("install", Shell("pip install -e .")),
    ("build", Shell("python -m build")),
    ("test", Shell("python -m pytest")),
    ("test:quiet", Shell("python -m pytest -q")),
    ("test:verbose", Shell("python -m pytest -v")),
    ("clean", Shell("rm -rf build dist .pytest_cache")),
    ("format", Shell("ruff format .")),
    ("lint", Shell("ruff check .")),
    ("check", Shell("mypy .")),
    ("run", Shell("python -m ${target}")),
    ("ci", Seq(&["lint", "test"])),
];

const UV: PresetTable = &[
    ("install", Shell("uv sync")),
    ("build", Shell("uv build")),
    ("test", Shell("uv run pytest")),
    ("test:quiet", Shell("uv run pytest -q")),
    ("test:verbose", Shell("uv run pytest -v")),
    ("clean", Shell("rm -rf build dist .pytest_cache")),
    ("format", Shell("uv run ruff format .")),
    ("lint", Shell("uv run ruff check .")),
    ("check", Shell("uv run mypy .")),
    ("run", Shell("uv run python -m ${target}")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const POETRY: PresetTable = &[
    ("install", Shell("poetry install")),
    ("build", Shell("poetry build")),
    ("test", Shell("poetry run pytest")),
    ("clean", Shell("rm -rf dist .pytest_cache")),
    ("format", Shell("poetry run ruff format .")),
    ("lint", Shell("poetry run ruff check .")),
    ("check", Shell("poetry check")),
    ("run", Shell("poetry run python -m ${target}")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const MAVEN: PresetTable = &[
    ("build", Shell("mvn package -DskipTests")),
    ("build:quiet", Shell("mvn -q package -DskipTests")),
    ("test", Shell("mvn test")),
    ("test:quiet", Shell("mvn -q test")),
    ("clean", Shell("mvn clean")),
    ("format", Shell("mvn spotless:apply")),
    ("lint", Shell("mvn checkstyle:check")),
    ("check", Shell("mvn verify")),
    ("run", Shell("mvn exec:java")),
    ("install", Shell("mvn dependency:resolve")),
    ("ci", Seq(&["lint", "test"])),
];

const GRADLE: PresetTable = &[
    ("build", Shell("./gradlew build -x test")),
    ("build:quiet", Shell("./gradlew build -x test --quiet")),
    ("test", Shell("./gradlew test")),
    ("test:verbose", Shell("./gradlew test --info")),
    ("clean", Shell("./gradlew clean")),
    ("format", Shell("./gradlew spotlessApply")),
    ("lint", Shell("./gradlew check -x test")),
    ("check", Shell("./gradlew check")),
    ("run", Shell("./gradlew run")),
    ("ci", Seq(&["lint", "test"])),
];

const DOTNET: PresetTable = &[
    ("install", Shell("dotnet restore")),
    ("build", Shell("dotnet build")),
    ("build:quiet", Shell("dotnet build --verbosity quiet")),
    ("build:verbose", Shell("dotnet build --verbosity detailed")),
    ("test", Shell("dotnet test")),
    ("clean", Shell("dotnet clean")),
    ("format", Shell("dotnet format")),
    ("lint", Shell("dotnet format --verify-no-changes")),
    ("check", Shell("dotnet build --no-restore")),
    ("run", Shell("dotnet run")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const ZIG: PresetTable = &[
    ("build", Shell("zig build")),
    ("test", Shell("zig build test")),
    ("clean", Shell("rm -rf zig-out .zig-cache")),
    ("format", Shell("zig fmt .")),
    ("lint", Shell("zig fmt --check .")),
    ("check", Shell("zig build check")),
    ("run", Shell("zig build run")),
    ("ci", Seq(&["lint", "test"])),
];

const SWIFT: PresetTable = &[
    ("build", Shell("swift build")),
    ("test", Shell("swift test")),
    ("clean", Shell("swift package clean")),
    ("format", Shell("swift format --in-place --recursive .")),
    ("lint", Shell("swift format lint --recursive .")),
    ("run", Shell("swift run")),
    ("install", Shell("swift package resolve")),
    ("ci", Seq(&["lint", "test"])),
];

const MIX: PresetTable = &[
    ("install", Shell("mix deps.get")),
    ("build", Shell("mix compile")),
    ("test", Shell("mix test")),
    ("clean", Shell("mix clean")),
    ("format", Shell("mix format")),
    ("lint", Shell("mix format --check-formatted")),
    ("run", Shell("mix run")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const BUNDLER: PresetTable = &[
    ("install", Shell("bundle install")),
    ("build", Off),
    ("test", Shell("bundle exec rake test")),
    ("clean", Off),
    ("format", Shell("bundle exec rubocop -a")),
    ("lint", Shell("bundle exec rubocop")),
    ("run", Shell("bundle exec ruby ${target}.rb")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const DART: PresetTable = &[
    ("install", Shell("dart pub get")),
    ("build", Shell("dart compile exe bin/${target}.dart")),
    ("test", Shell("dart test")),
    ("clean", Off),
    ("format", Shell("dart format .")),
    ("lint", Shell("dart analyze")),
    ("run", Shell("dart run")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const COMPOSER: PresetTable = &[
    ("install", Shell("composer install")),
    ("build", Off),
    ("test", Shell("composer test")),
    ("clean", Off),
    ("format", Shell("composer format")),
    ("lint", Shell("composer lint")),
    ("ci", Seq(&["install", "lint", "test"])),
];

const STACK: PresetTable = &[
    ("build", Shell("stack build")),
    ("test", Shell("stack test")),
    ("clean", Shell("stack clean")),
    ("format", Shell("ormolu --mode inplace $(git ls-files '*.hs')")),
    ("lint", Shell("hlint .")),
    ("run", Shell("stack run")),
    ("ci", Seq(&["lint", "test"])),
];

const CABAL: PresetTable = &[
    ("build", Shell("cabal build")),
    ("test", Shell("cabal test")),
    ("clean", Shell("cabal clean")),
    ("format", Shell("ormolu --mode inplace $(git ls-files '*.hs')")),
    ("lint", Shell("hlint .")),
    ("run", Shell("cabal run")),
    ("install", Shell("cabal update")),
    ("ci", Seq(&["lint", "test"])),
];

const DUNE: PresetTable = &[
    ("build", Shell("dune build")),
    ("test", Shell("dune test")),
    ("clean", Shell("dune clean")),
    ("format", Shell("dune fmt")),
    ("run", Shell("dune exec ./${target}.exe")),
    ("ci", Seq(&["build", "test"])),
];

const CMAKE: PresetTable = &[
    ("configure", Shell("cmake -S . -B build")),
    ("build", Shell("cmake --build build")),
    ("build:verbose", Shell("cmake --build build --verbose")),
    ("test", Shell("ctest --test-dir build")),
    ("test:verbose", Shell("ctest --test-dir build --verbose")),
    ("clean", Shell("cmake --build build --target clean")),
    ("format", Shell("clang-format -i $(git ls-files '*.c' '*.cc' '*.cpp' '*.h' '*.hpp')")),
    ("ci", Seq(&["configure", "build", "test"])),
];

const MAKE: PresetTable = &[
    ("build", Shell("make")),
    ("test", Shell("make test")),
    ("clean", Shell("make clean")),
    ("format", Shell("make format")),
    ("lint", Shell("make lint")),
    ("run", Shell("make run")),
    ("ci", Seq(&["build", "test"])),
];

/// All built-in presets, keyed by toolchain name
const PRESETS: &[(&str, PresetTable)] = &[
    ("bun", BUN),
    ("bundler", BUNDLER),
    ("cabal", CABAL),
    ("cargo", CARGO),
    ("cmake", CMAKE),
    ("composer", COMPOSER),
    ("dart", DART),
    ("deno", DENO),
    ("dotnet", DOTNET),
    ("dune", DUNE),
    ("go", GO),
    ("gradle", GRADLE),
    ("make", MAKE),
    ("maven", MAVEN),
    ("mix", MIX),
    ("npm", NPM),
    ("pnpm", PNPM),
    ("poetry", POETRY),
    ("python", PYTHON),
    ("stack", STACK),
    ("swift", SWIFT),
    ("uv", UV),
    ("yarn", YARN),
    ("zig", ZIG),
];

static BUILTINS: Lazy<BTreeMap<&'static str, Toolchain>> = Lazy::new(|| {
    PRESETS
        .iter()
        .map(|(name, table)| (*name, Toolchain::new(*name, to_command_table(table))))
        .collect()
});

fn to_command_table(table: PresetTable) -> CommandTable {
    table
        .iter()
        .map(|(command, preset)| {
            let def = match preset {
                Shell(template) => CommandDef::shell(*template),
                Seq(names) => CommandDef::sequence(names.iter().copied()),
                Off => CommandDef::Disabled,
            };
            (command.to_string(), def)
        })
        .collect()
}

/// Look up a built-in toolchain by name
pub fn builtin(name: &str) -> Option<&'static Toolchain> {
    BUILTINS.get(name)
}

/// Names of all built-in toolchains, sorted
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.keys().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let cargo = builtin("cargo").unwrap();
        assert_eq!(cargo.name, "cargo");
        assert_eq!(
            cargo.command("build"),
            Some(&CommandDef::shell("cargo build"))
        );
        assert!(builtin("cobol").is_none());
    }

    #[test]
    fn test_builtin_names_sorted() {
        let names: Vec<_> = builtin_names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"npm"));
        assert!(names.contains(&"pnpm"));
    }

    #[test]
    fn test_presets_include_verbosity_variants() {
        let cargo = builtin("cargo").unwrap();
        assert!(cargo.command("test:quiet").is_some());
        assert!(cargo.command("test:verbose").is_some());
    }

    #[test]
    fn test_sequences_reference_existing_commands() {
        for (name, toolchain) in BUILTINS.iter() {
            for (command, def) in &toolchain.commands {
                if let CommandDef::Sequence(steps) = def {
                    for step in steps {
                        assert!(
                            toolchain.commands.contains_key(step),
                            "{name}:{command} refers to missing '{step}'"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_disabled_presets() {
        assert_eq!(
            builtin("deno").unwrap().command("clean"),
            Some(&CommandDef::Disabled)
        );
    }
}
