use crate::detectors;
use crate::types::ArchitecturalPattern;
use codewiki_chunker::FileAnalysis;
use std::cmp::Ordering;

/// A detector inspects the whole corpus and reports at most one pattern
pub type DetectorFn = fn(&[FileAnalysis]) -> Option<ArchitecturalPattern>;

/// Registry of named detectors run over analyzed files
#[derive(Clone)]
pub struct PatternDetector {
    detectors: Vec<(String, DetectorFn)>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PatternDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternDetector")
            .field("detectors", &self.names())
            .finish()
    }
}

impl PatternDetector {
    /// Detector with every built-in rule registered
    pub fn new() -> Self {
        let builtin: [(&str, DetectorFn); 11] = [
            ("repository", detectors::detect_repository),
            ("service-layer", detectors::detect_service_layer),
            ("factory", detectors::detect_factory),
            ("singleton", detectors::detect_singleton),
            ("observer", detectors::detect_observer),
            ("provider", detectors::detect_provider),
            ("hook", detectors::detect_hooks),
            ("middleware", detectors::detect_middleware),
            ("data-transfer-object", detectors::detect_dto),
            ("dependency-injection", detectors::detect_dependency_injection),
            ("layered-architecture", detectors::detect_layered_architecture),
        ];
        builtin
            .into_iter()
            .fold(Self::empty(), |detector, (name, f)| detector.with_detector(name, f))
    }

    /// Detector with no rules
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Register an additional rule. A rule with the same name is replaced.
    #[must_use]
    pub fn with_detector(mut self, name: impl Into<String>, detector: DetectorFn) -> Self {
        let name = name.into();
        match self.detectors.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = detector,
            None => self.detectors.push((name, detector)),
        }
        self
    }

    /// Registered rule names in run order
    pub fn names(&self) -> Vec<&str> {
        self.detectors.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Run every rule; results sorted by descending confidence, then by type
    pub fn detect(&self, files: &[FileAnalysis]) -> Vec<ArchitecturalPattern> {
        let mut patterns: Vec<ArchitecturalPattern> = self
            .detectors
            .iter()
            .filter_map(|(name, detector)| {
                let mut pattern = detector(files)?;
                if pattern.confidence.is_nan() {
                    pattern.confidence = 0.0;
                }
                pattern.confidence = pattern.confidence.clamp(0.0, 1.0);
                log::debug!(
                    "Detector {name} matched {} location(s), confidence {:.2}",
                    pattern.locations.len(),
                    pattern.confidence
                );
                Some(pattern)
            })
            .collect();

        patterns.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.pattern_type.cmp(&b.pattern_type))
                .then_with(|| a.name.cmp(&b.name))
        });

        log::info!(
            "Detected {} architectural pattern(s) across {} files",
            patterns.len(),
            files.len()
        );
        patterns
    }
}
