//! Test fixture generators
//!
//! Fake SMT solver executables (shell scripts) and ready-made configurations.

use dse_engine::config::{DseConfig, Preset, RankingPolicy, ValidatedConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Executable script living as long as its directory
pub struct FakeSolver {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write `body` as an executable `/bin/sh` script
#[cfg(unix)]
pub fn fake_solver(body: &str) -> FakeSolver {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fake-solver");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod");
    FakeSolver { dir, path }
}

/// Solver that drains stdin and prints `answer`
#[cfg(unix)]
pub fn answering_solver(answer: &str) -> FakeSolver {
    fake_solver(&format!("cat > /dev/null\ncat <<'ANSWER'\n{answer}\nANSWER"))
}

/// Solver that records its pid in `pid` and then hangs
#[cfg(unix)]
pub fn hanging_solver() -> FakeSolver {
    fake_solver("echo $$ > \"$(dirname \"$0\")/pid\"\nexec sleep 30")
}

/// Local-search-only configuration, deterministic seed, every branch in order
pub fn local_only_config() -> ValidatedConfig {
    DseConfig::preset(Preset::Fast)
        .solver(|c| c.no_executable())
        .local_search(|c| c.seed(7))
        .exploration(|c| c.ranking(RankingPolicy::NegateAllInOrder))
        .build()
        .expect("valid config")
}

/// Configuration pointing at `solver`, with a short timeout
pub fn external_solver_config(solver: &FakeSolver, fallback: bool) -> ValidatedConfig {
    let path = solver.path.clone();
    DseConfig::preset(Preset::Fast)
        .solver(|c| c.executable(path).args(Vec::<String>::new()).timeout_ms(500))
        .local_search(|c| c.seed(7).fallback_enabled(fallback))
        .exploration(|c| c.ranking(RankingPolicy::NegateAllInOrder))
        .build()
        .expect("valid config")
}
