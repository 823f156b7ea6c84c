//! Change-impact analysis over the call graph.
//!
//! Upstream is the set of transitive callers, downstream the set of
//! transitive callees, both optionally bounded by a BFS depth. Raising the
//! bound never shrinks either set, and the target itself is never a member.

use crate::config::{ImpactConfig, ImpactWeights};
use crate::core::{
    Category, Evidence, FunctionDef, ImpactLevel, ImpactScore, Issue, Location, Result, Severity,
};
use crate::graph::AnalysisContext;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub struct ImpactAnalysis {
    pub score: ImpactScore,
    pub max_depth: Option<usize>,
    pub upstream: BTreeSet<String>,
    pub downstream: BTreeSet<String>,
    pub upstream_files: BTreeSet<String>,
    pub downstream_files: BTreeSet<String>,
    pub affected_files: BTreeSet<String>,
}

impl ImpactAnalysis {
    pub fn level(&self) -> ImpactLevel {
        self.score.level()
    }
}

pub struct ImpactAnalyzer<'a> {
    ctx: &'a AnalysisContext,
    weights: ImpactWeights,
}

impl<'a> ImpactAnalyzer<'a> {
    pub fn new(ctx: &'a AnalysisContext, weights: ImpactWeights) -> Self {
        Self { ctx, weights }
    }

    /// `target` is a qualified name or a local name unique in the project
    pub fn analyze(&self, target: &str, max_depth: Option<usize>) -> Result<ImpactAnalysis> {
        let function = self.ctx.registry().lookup(target)?;
        Ok(self.analyze_function(function, max_depth))
    }

    pub fn score(&self, target: &str, max_depth: Option<usize>) -> Result<ImpactScore> {
        self.analyze(target, max_depth).map(|analysis| analysis.score)
    }

    fn analyze_function(&self, function: &FunctionDef, max_depth: Option<usize>) -> ImpactAnalysis {
        let graph = self.ctx.call_graph();
        let upstream = graph.upstream(&function.qualified_name, max_depth);
        let downstream = graph.downstream(&function.qualified_name, max_depth);

        let score = ImpactScore {
            function: function.qualified_name.clone(),
            upstream: upstream.len(),
            downstream: downstream.len(),
            complexity: function.complexity,
            score: self
                .weights
                .score(upstream.len(), downstream.len(), function.complexity),
        };

        let upstream_files = self.files_of(&upstream);
        let downstream_files = self.files_of(&downstream);
        let mut affected_files = upstream_files.clone();
        affected_files.extend(self.ctx.dependents(&function.file));

        ImpactAnalysis {
            score,
            max_depth,
            upstream,
            downstream,
            upstream_files,
            downstream_files,
            affected_files,
        }
    }

    fn files_of(&self, functions: &BTreeSet<String>) -> BTreeSet<String> {
        functions
            .iter()
            .filter_map(|q| self.ctx.function(q))
            .map(|f| f.file.clone())
            .collect()
    }
}

/// Findings for the configured targets plus, when `scan` is set, every
/// function scoring at least `report_threshold`
pub fn impact_findings(ctx: &AnalysisContext, config: &ImpactConfig, scan: bool) -> Vec<Issue> {
    let analyzer = ImpactAnalyzer::new(ctx, config.weights());
    let mut issues = Vec::new();
    let mut targeted = HashSet::new();

    for target in &config.targets {
        match analyzer.analyze(target, config.max_depth) {
            Ok(analysis) => {
                targeted.insert(analysis.score.function.clone());
                let severity = match analysis.level() {
                    ImpactLevel::High | ImpactLevel::Critical => Severity::Warning,
                    ImpactLevel::Low | ImpactLevel::Medium => Severity::Suggestion,
                };
                if let Some(function) = ctx.function(&analysis.score.function) {
                    issues.push(impact_issue(function, analysis, severity));
                }
            }
            Err(e) => log::warn!("Skipping impact target: {e}"),
        }
    }

    if scan {
        let threshold = config.report_threshold;
        let functions: Vec<&FunctionDef> = ctx
            .registry()
            .iter()
            .filter(|f| !targeted.contains(&f.qualified_name))
            .collect();
        let mut high: Vec<Issue> = functions
            .par_iter()
            .map(|f| (f, analyzer.analyze_function(f, config.max_depth)))
            .filter(|(_, analysis)| analysis.score.score >= threshold)
            .map(|(f, analysis)| impact_issue(f, analysis, Severity::Warning))
            .collect();
        log::debug!(
            "{} of {} functions reach impact score {threshold}",
            high.len(),
            functions.len()
        );
        issues.append(&mut high);
    }

    issues
}

fn impact_issue(function: &FunctionDef, analysis: ImpactAnalysis, severity: Severity) -> Issue {
    let level = analysis.level();
    let description = format!(
        "Changing '{}' affects {} caller(s) and {} callee(s) across {} file(s) \
         (impact score {:.2}, {level})",
        function.name,
        analysis.score.upstream,
        analysis.score.downstream,
        analysis.affected_files.len(),
        analysis.score.score,
    );

    Issue::new(
        Category::Maintainability,
        severity,
        Location::file(&function.file)
            .with_lines(function.lines)
            .with_symbol(&function.qualified_name),
        Evidence::Impact {
            score: analysis.score,
            level,
            max_depth: analysis.max_depth,
            upstream_files: analysis.upstream_files.into_iter().collect(),
            downstream_files: analysis.downstream_files.into_iter().collect(),
            affected_files: analysis.affected_files.into_iter().collect(),
        },
        description,
    )
}
