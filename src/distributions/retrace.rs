//! Running several tracers over one file set.

use crate::report::Reporter;

use super::{Distribution, DistributionTracer, UnknownFiles};

/// Result of running a chain of tracers.
#[derive(Debug, Default)]
pub struct TraceOutcome {
    pub distributions: Vec<Box<dyn Distribution>>,
    /// Files no tracer could attribute.
    pub unknown_files: UnknownFiles,
}

/// Run `tracers` in order, handing each the files the previous ones left
/// unknown.
///
/// A tracer that finds nothing leaves the unknown set as it was.
pub fn identify_distributions(
    tracers: &mut [Box<dyn DistributionTracer + '_>],
    files: &UnknownFiles,
    reporter: &dyn Reporter,
) -> TraceOutcome {
    let mut outcome = TraceOutcome {
        distributions: Vec::new(),
        unknown_files: files.clone(),
    };

    for tracer in tracers.iter_mut() {
        if outcome.unknown_files.is_empty() {
            break;
        }

        let before = outcome.unknown_files.len();
        let found = tracer.identify_distributions(&outcome.unknown_files);
        let count = found.len();

        let mut remaining = None;
        for (dist, unknown) in found {
            outcome.distributions.push(dist);
            remaining = Some(unknown);
        }
        if let Some(unknown) = remaining {
            outcome.unknown_files = unknown;
        }

        reporter.debug(&format!(
            "{}: {} distributions, {} of {} files left unknown",
            tracer.name(),
            count,
            outcome.unknown_files.len(),
            before
        ));
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::Package;
    use crate::report::MockReporter;
    use std::path::{Path, PathBuf};

    #[derive(Debug)]
    struct Claimed {
        name: String,
    }

    impl Distribution for Claimed {
        fn kind(&self) -> &'static str {
            "test"
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn path(&self) -> Option<&Path> {
            None
        }

        fn packages(&self) -> Vec<&dyn Package> {
            Vec::new()
        }

        fn to_value(&self) -> serde_json::Result<serde_json::Value> {
            Ok(serde_json::json!({ "name": self.name }))
        }
    }

    /// Claims every file starting with its prefix.
    struct PrefixTracer {
        prefix: &'static str,
    }

    impl DistributionTracer for PrefixTracer {
        fn name(&self) -> &str {
            self.prefix
        }

        fn identify_distributions(
            &mut self,
            files: &UnknownFiles,
        ) -> Vec<(Box<dyn Distribution>, UnknownFiles)> {
            let remaining: UnknownFiles = files
                .iter()
                .filter(|f| !f.starts_with(self.prefix))
                .cloned()
                .collect();
            if remaining.len() == files.len() {
                return Vec::new();
            }
            let dist = Claimed {
                name: self.prefix.to_string(),
            };
            vec![(Box::new(dist) as Box<dyn Distribution>, remaining)]
        }
    }

    fn files(paths: &[&str]) -> UnknownFiles {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn each_tracer_sees_what_the_previous_left() {
        let mut tracers: Vec<Box<dyn DistributionTracer>> = vec![
            Box::new(PrefixTracer { prefix: "/opt" }),
            Box::new(PrefixTracer { prefix: "/usr" }),
            Box::new(PrefixTracer { prefix: "/srv" }),
        ];

        let reporter = MockReporter::new();

        let outcome = identify_distributions(
            &mut tracers,
            &files(&["/opt/conda/bin/xz", "/usr/bin/ls", "/etc/hosts"]),
            &reporter,
        );

        let names: Vec<_> = outcome.distributions.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["/opt", "/usr"]);
        assert_eq!(outcome.unknown_files, files(&["/etc/hosts"]));
        assert_eq!(
            reporter.debugs(),
            vec![
                "/opt: 1 distributions, 2 of 3 files left unknown",
                "/usr: 1 distributions, 1 of 2 files left unknown",
                "/srv: 0 distributions, 1 of 1 files left unknown",
            ]
        );
    }

    #[test]
    fn stops_once_everything_is_known() {
        let mut tracers: Vec<Box<dyn DistributionTracer>> = vec![
            Box::new(PrefixTracer { prefix: "/opt" }),
            Box::new(PrefixTracer { prefix: "/usr" }),
        ];

        let reporter = MockReporter::new();

        let outcome = identify_distributions(&mut tracers, &files(&["/opt/a"]), &reporter);

        assert_eq!(outcome.distributions.len(), 1);
        assert!(outcome.unknown_files.is_empty());
        assert_eq!(reporter.debugs().len(), 1);
    }

    #[test]
    fn no_tracers_leave_everything_unknown() {
        let input = files(&["/a", "/b"]);
        let outcome = identify_distributions(&mut [], &input, &MockReporter::new());
        assert!(outcome.distributions.is_empty());
        assert_eq!(outcome.unknown_files, input);
    }
}
