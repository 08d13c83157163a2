//! Static checks of the container build files

use std::path::Path;

const DOCKERFILES: [&str; 2] = ["Dockerfile", "Dockerfile.alpine"];

fn read(name: &str) -> String {
    std::fs::read_to_string(Path::new(env!("CARGO_MANIFEST_DIR")).join(name)).unwrap()
}

/// Instructions without comments or blank lines.
fn instructions(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

fn position(lines: &[&str], predicate: impl Fn(&str) -> bool) -> usize {
    lines.iter().position(|l| predicate(l)).unwrap()
}

#[test]
fn test_exposes_only_dashboard_port() {
    for name in DOCKERFILES {
        let content = read(name);
        let exposed: Vec<_> = instructions(&content)
            .into_iter()
            .filter(|l| l.starts_with("EXPOSE"))
            .collect();
        assert_eq!(exposed, vec!["EXPOSE 8501"], "{}", name);
    }
}

#[test]
fn test_ends_with_fixed_serve_command() {
    for name in DOCKERFILES {
        let content = read(name);
        let lines = instructions(&content);
        assert_eq!(
            lines.last().copied(),
            Some(r#"CMD ["covidash", "serve"]"#),
            "{}",
            name
        );
        assert_eq!(lines.iter().filter(|l| l.starts_with("CMD")).count(), 1);
    }
}

#[test]
fn test_dependencies_built_before_sources_copied() {
    for name in DOCKERFILES {
        let content = read(name);
        let lines = instructions(&content);

        let manifests = position(&lines, |l| {
            l.starts_with("COPY") && l.contains("Cargo.toml") && l.contains("Cargo.lock")
        });
        let deps_build = position(&lines, |l| l.contains("cargo build --release"));
        let sources = position(&lines, |l| l.starts_with("COPY src"));

        assert!(manifests < deps_build, "{}", name);
        assert!(deps_build < sources, "{}", name);
    }
}

#[test]
fn test_dependency_build_failure_is_not_ignored() {
    for name in DOCKERFILES {
        let content = read(name);
        assert!(!content.contains("|| true"), "{}", name);
        assert!(!content.contains("; exit 0"), "{}", name);
    }
}

#[test]
fn test_application_installed_under_usr_local_app() {
    for name in DOCKERFILES {
        let content = read(name);
        assert!(content.contains("WORKDIR /usr/local/app"), "{}", name);
        assert!(content.contains("/usr/local/app/share"), "{}", name);
    }
}
