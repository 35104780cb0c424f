//! CLI command implementations.

use crate::{GraphKind, TimelineKind};
use bibnet_core::{CorpusSnapshot, EntityStore, MemoryStore};
use bibnet_graph::{
    AnalysisConfig, AuthorLookup, Connectivity, CorpusStore, Metric, NetworkAnalyzer, Ranking,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

type SharedStore = Arc<dyn EntityStore + Send + Sync>;

/// Options shared by every command.
pub struct Context {
    pub json: bool,
    pub corpus: Option<PathBuf>,
    pub store: PathBuf,
    pub config: AnalysisConfig,
}

impl Context {
    fn open_store(&self) -> Result<SharedStore> {
        if let Some(path) = &self.corpus {
            let snapshot = CorpusSnapshot::from_json_file(path)?;
            let store: SharedStore = Arc::new(MemoryStore::from_snapshot(snapshot));
            return Ok(store);
        }

        if !self.store.exists() {
            return Err(format!(
                "no corpus store at {} (run `bibnet import <corpus.json>` or pass --corpus)",
                self.store.display()
            )
            .into());
        }
        let store: SharedStore = Arc::new(CorpusStore::open(&self.store)?);
        Ok(store)
    }

    fn analyzer(&self) -> Result<NetworkAnalyzer<SharedStore>> {
        Ok(NetworkAnalyzer::with_config(
            self.open_store()?,
            self.config.clone(),
        ))
    }

    fn analyzer_with(&self, config: AnalysisConfig) -> Result<NetworkAnalyzer<SharedStore>> {
        Ok(NetworkAnalyzer::with_config(self.open_store()?, config))
    }

    /// Prints `value` as JSON, or hands it to `human` for formatted text.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

/// Finds the analysis config: an explicit path, then the project's
/// `.bibnet/config.json`, then the user config dir, then defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AnalysisConfig> {
    if let Some(path) = explicit {
        return Ok(AnalysisConfig::from_file(path)?);
    }

    let mut candidates = vec![PathBuf::from(".bibnet").join("config.json")];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("bibnet").join("config.json"));
    }

    for candidate in candidates {
        if candidate.exists() {
            debug!("Using config {}", candidate.display());
            return Ok(AnalysisConfig::from_file(&candidate)?);
        }
    }
    Ok(AnalysisConfig::default())
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

/// Initialize Bibnet in a directory.
pub fn init(path: &Path) -> Result<()> {
    let bibnet_dir = path.join(".bibnet");
    let config_path = bibnet_dir.join("config.json");

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&bibnet_dir)?;
    AnalysisConfig::default().write_to(&config_path)?;

    println!("{} Initialized Bibnet in {}", "✓".green(), path.display());
    println!("  Run {} to load a corpus", "bibnet import <corpus.json>".cyan());

    Ok(())
}

/// Import a corpus file into the store.
pub fn import(ctx: &Context, corpus_file: &Path, replace: bool) -> Result<()> {
    let snapshot = CorpusSnapshot::from_json_file(corpus_file)?;

    if let Some(parent) = ctx.store.parent() {
        fs::create_dir_all(parent)?;
    }
    let store = CorpusStore::open(&ctx.store)?;
    if replace {
        store.clear()?;
    }

    let spinner = spinner("Importing corpus...")?;
    store.import_corpus(&snapshot)?;
    spinner.finish_and_clear();

    println!(
        "{} Imported {} documents and {} citations into {}",
        "✓".green(),
        snapshot.documents.len().to_string().cyan(),
        snapshot.citations.len().to_string().cyan(),
        ctx.store.display()
    );
    println!(
        "  Store now holds {} documents (revision {})",
        store.document_count(),
        store.revision()
    );

    Ok(())
}

/// Show corpus statistics.
pub fn stats(ctx: &Context) -> Result<()> {
    let stats = ctx.analyzer()?.corpus_stats()?;

    ctx.emit(&stats, |stats| {
        println!("{}", "Corpus Statistics".cyan().bold());
        println!();
        println!("  {} {}", "Documents:".dimmed(), stats.total_documents);
        println!("  {} {}", "Authors:".dimmed(), stats.total_authors);
        println!(
            "  {} {} ({} internal, {} external)",
            "Citations:".dimmed(),
            stats.total_citations,
            stats.resolved_citations,
            stats.unresolved_citations
        );
        if !stats.documents_by_year.is_empty() {
            println!();
            println!("{}", "Documents by year:".dimmed());
            for (year, count) in &stats.documents_by_year {
                println!("  {} {}", year, count);
            }
        }
        if stats.documents_without_year > 0 {
            println!("  {} {}", "undated".dimmed(), stats.documents_without_year);
        }
    })
}

fn print_ranking<K: Display>(title: &str, ranking: &Ranking<K>) {
    println!("{}", title.yellow());
    if ranking.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (key, score) in ranking {
        println!("  {:<40} {:.4}", key.to_string(), score);
    }
}

fn print_metric_ranking<K: Display>(title: &str, metric: &Metric<Ranking<K>>) {
    match metric {
        Metric::Computed { value } => print_ranking(title, value),
        Metric::Omitted { reason } => {
            println!("{}", title.yellow());
            println!("  {} {}", "omitted:".dimmed(), reason);
        }
    }
}

fn print_metric<T: Display>(label: &str, metric: &Metric<T>) {
    match metric {
        Metric::Computed { value } => println!("  {} {}", label.dimmed(), value),
        Metric::Omitted { reason } => println!("  {} omitted ({})", label.dimmed(), reason),
    }
}

fn print_connectivity(connectivity: &Connectivity) {
    match connectivity {
        Connectivity::Connected {
            diameter,
            average_path_length,
        } => {
            println!("  {} {}", "Connected:".dimmed(), "yes".green());
            print_metric("Diameter:", diameter);
            if let Some(average) = average_path_length {
                print_metric("Average path length:", &average.clone().map(|a| format!("{:.3}", a)));
            }
        }
        Connectivity::Disconnected {
            connected_components,
            largest_component_size,
            largest_component_diameter,
        } => {
            println!("  {} {}", "Connected:".dimmed(), "no".yellow());
            println!("  {} {}", "Components:".dimmed(), connected_components);
            if let Some(size) = largest_component_size {
                println!("  {} {}", "Largest component:".dimmed(), size);
            }
            if let Some(diameter) = largest_component_diameter {
                print_metric("Largest component diameter:", diameter);
            }
        }
    }
}

fn citation_config(ctx: &Context, limit: Option<usize>) -> AnalysisConfig {
    let mut config = ctx.config.clone();
    if let Some(limit) = limit {
        config.top_k = limit;
    }
    config
}

fn author_config(ctx: &Context, limit: Option<usize>) -> AnalysisConfig {
    let mut config = ctx.config.clone();
    if let Some(limit) = limit {
        config.author_top_k = limit;
    }
    config
}

/// Citation network overview.
pub fn citations(ctx: &Context, limit: Option<usize>) -> Result<()> {
    let analyzer = ctx.analyzer_with(citation_config(ctx, limit))?;

    let spinner = spinner("Analyzing citation network...")?;
    let overview = analyzer.citation_overview();
    spinner.finish_and_clear();
    let overview = overview?;

    ctx.emit(&overview, |o| {
        println!("{}", "Citation Network".cyan().bold());
        println!();
        println!("  {} {}", "Papers:".dimmed(), o.total_papers);
        println!("  {} {}", "Citations:".dimmed(), o.total_citations);
        println!(
            "  {} {:.3}",
            "Citations per paper:".dimmed(),
            o.average_citations_per_paper
        );
        print_connectivity(&o.connectivity);
        println!();
        print_ranking("Most cited (in-degree)", &o.most_cited_by_in_degree);
        print_ranking("Most citing (out-degree)", &o.most_citing_by_out_degree);
        print_ranking("Highest PageRank", &o.highest_pagerank);
    })
}

/// Author centrality overview.
pub fn authors(ctx: &Context, limit: Option<usize>) -> Result<()> {
    let analyzer = ctx.analyzer_with(author_config(ctx, limit))?;

    let spinner = spinner("Analyzing co-authorship network...")?;
    let overview = analyzer.author_centrality();
    spinner.finish_and_clear();
    let overview = overview?;

    ctx.emit(&overview, |o| {
        println!("{}", "Co-authorship Network".cyan().bold());
        println!();
        println!("  {} {}", "Authors:".dimmed(), o.total_authors);
        println!("  {} {}", "Collaborations:".dimmed(), o.total_collaborations);
        println!(
            "  {} {:.3}",
            "Collaborators per author:".dimmed(),
            o.average_collaborators_per_author
        );
        print_connectivity(&o.connectivity);
        println!();
        print_ranking("Degree centrality", &o.top_by_degree_centrality);
        print_metric_ranking("Betweenness centrality", &o.top_by_betweenness_centrality);
        print_metric_ranking("Closeness centrality", &o.top_by_closeness_centrality);
        print_metric_ranking("Eigenvector centrality", &o.top_by_eigenvector_centrality);
    })
}

/// Research communities.
pub fn communities(ctx: &Context) -> Result<()> {
    let communities = ctx.analyzer()?.research_communities()?;

    ctx.emit(&communities, |communities| {
        if communities.is_empty() {
            println!("No communities of {} or more authors", ctx.config.min_community_size);
            return;
        }
        println!("Found {} communities:\n", communities.len());
        for community in communities {
            println!(
                "  {} {} authors, {} papers, {} collaborations, density {:.3}",
                format!("#{}", community.community_id).cyan(),
                community.size,
                community.total_papers,
                community.internal_collaborations,
                community.density
            );
            for member in &community.key_authors {
                println!(
                    "    • {} {}",
                    member.name,
                    format!("({} papers)", member.papers_count).dimmed()
                );
            }
        }
    })
}

/// Citation clusters.
pub fn clusters(ctx: &Context) -> Result<()> {
    let clusters = ctx.analyzer()?.citation_clusters()?;

    ctx.emit(&clusters, |clusters| {
        if clusters.is_empty() {
            println!("No clusters of {} or more papers", ctx.config.min_community_size);
            return;
        }
        println!("Found {} clusters:\n", clusters.len());
        for cluster in clusters {
            println!(
                "  {} {} papers, {} internal citations, density {:.3}",
                format!("#{}", cluster.cluster_id).cyan(),
                cluster.size,
                cluster.internal_citations,
                cluster.density
            );
            for doc in &cluster.documents {
                let year = doc.year.map(|y| y.to_string()).unwrap_or_else(|| "n.d.".to_string());
                println!("    • {} {}", doc.title, format!("({})", year).dimmed());
            }
        }
    })
}

/// Activity per year.
pub fn timeline(ctx: &Context, kind: TimelineKind) -> Result<()> {
    let analyzer = ctx.analyzer()?;

    match kind {
        TimelineKind::Citations => {
            let timeline = analyzer.citation_timeline()?;
            ctx.emit(&timeline, |t| {
                println!("{}", "Citation Timeline".cyan().bold());
                println!("  {:<6} {:>6} {:>9} {:>6}", "year", "made", "received", "net");
                for (year, entry) in &t.timeline {
                    println!(
                        "  {:<6} {:>6} {:>9} {:>6}",
                        year, entry.citations_made, entry.citations_received, entry.net_citations
                    );
                }
            })
        }
        TimelineKind::Collaboration => {
            let timeline = analyzer.collaboration_timeline()?;
            ctx.emit(&timeline, |t| {
                println!("{}", "Collaboration Timeline".cyan().bold());
                println!(
                    "  {:<6} {:>6} {:>6} {:>6} {:>8} {:>6} {:>6}",
                    "year", "papers", "collab", "solo", "authors", "pairs", "rate"
                );
                for (year, entry) in &t.timeline {
                    println!(
                        "  {:<6} {:>6} {:>6} {:>6} {:>8} {:>6} {:>6.2}",
                        year,
                        entry.total_papers,
                        entry.collaborative_papers,
                        entry.solo_papers,
                        entry.unique_authors,
                        entry.unique_collaborations,
                        entry.collaboration_rate
                    );
                }
            })
        }
    }
}

/// Profile of one author.
pub fn profile(ctx: &Context, name: &str) -> Result<()> {
    let lookup = ctx.analyzer()?.author_profile(name)?;

    ctx.emit(&lookup, |lookup| match lookup {
        AuthorLookup::NotFound { error } => {
            println!("{} {}: \"{}\"", "✗".red(), error, name);
        }
        AuthorLookup::Found(p) => {
            println!("{}", p.name.cyan().bold());
            println!();
            println!(
                "  {} {} ({} collaborative, {} solo)",
                "Papers:".dimmed(),
                p.total_papers,
                p.collaborative_papers,
                p.solo_papers
            );
            println!("  {} {}", "Collaborators:".dimmed(), p.unique_collaborators);
            println!("  {} {:.2}", "Collaboration rate:".dimmed(), p.collaboration_rate);
            if !p.years_active.is_empty() {
                let years: Vec<String> = p.years_active.iter().map(|y| y.to_string()).collect();
                println!("  {} {}", "Years active:".dimmed(), years.join(", "));
            }
            println!();
            println!("{}", "Top collaborators".yellow());
            for collaborator in &p.top_collaborators {
                println!(
                    "  {:<40} {}",
                    collaborator.name, collaborator.collaboration_count
                );
            }
            println!();
            println!("{}", "Papers".yellow());
            for paper in &p.papers {
                let year = paper.year.map(|y| y.to_string()).unwrap_or_else(|| "n.d.".to_string());
                println!("  {} {}", year.dimmed(), paper.title);
            }
        }
    })
}

/// Most cited papers.
pub fn most_cited(ctx: &Context, limit: usize) -> Result<()> {
    let papers = ctx.analyzer()?.most_cited_papers(limit)?;

    ctx.emit(&papers, |papers| {
        println!("{}", "Most cited papers".cyan().bold());
        for paper in papers {
            println!(
                "  {:>4}  {}",
                paper.citation_count.to_string().green(),
                paper.document.title
            );
        }
    })
}

/// Papers making the most citations.
pub fn most_citing(ctx: &Context, limit: usize) -> Result<()> {
    let papers = ctx.analyzer()?.most_citing_papers(limit)?;

    ctx.emit(&papers, |papers| {
        println!("{}", "Most citing papers".cyan().bold());
        for paper in papers {
            println!(
                "  {:>4}  {}",
                paper.citations_made.to_string().green(),
                paper.document.title
            );
        }
    })
}

/// Authors with the most unique collaborators.
pub fn most_collaborative(ctx: &Context, limit: usize) -> Result<()> {
    let authors = ctx.analyzer()?.most_collaborative_authors(limit)?;

    ctx.emit(&authors, |authors| {
        println!("{}", "Most collaborative authors".cyan().bold());
        for author in authors {
            println!(
                "  {:<40} {} collaborators, {} papers",
                author.name,
                author.unique_collaborators.to_string().green(),
                author.total_papers
            );
        }
    })
}

/// Strongest collaborations.
pub fn strongest(ctx: &Context, limit: usize) -> Result<()> {
    let pairs = ctx.analyzer()?.strongest_collaborations(limit)?;

    ctx.emit(&pairs, |pairs| {
        println!("{}", "Strongest collaborations".cyan().bold());
        for pair in pairs {
            println!(
                "  {} & {} {}",
                pair.authors[0],
                pair.authors[1],
                format!("({} papers)", pair.collaboration_count).dimmed()
            );
        }
    })
}

/// Both overviews, computed concurrently on the blocking pool.
pub async fn report(ctx: &Context) -> Result<()> {
    let analyzer = ctx.analyzer()?;
    let citation_analyzer = analyzer.clone();

    let spinner = spinner("Running citation and co-authorship analyses...")?;
    let citations = tokio::task::spawn_blocking(move || citation_analyzer.citation_overview());
    let authors = tokio::task::spawn_blocking(move || analyzer.author_centrality());
    let (citations, authors) = tokio::join!(citations, authors);
    spinner.finish_and_clear();

    let citations = citations??;
    let authors = authors??;

    if ctx.json {
        let report = serde_json::json!({
            "citations": citations,
            "authors": authors,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Bibnet Report".cyan().bold());
    println!();
    println!(
        "  {} {} papers, {} citations",
        "Citation network:".dimmed(),
        citations.total_papers,
        citations.total_citations
    );
    print_connectivity(&citations.connectivity);
    println!(
        "  {} {} authors, {} collaborations",
        "Co-authorship network:".dimmed(),
        authors.total_authors,
        authors.total_collaborations
    );
    print_connectivity(&authors.connectivity);
    println!();
    print_ranking("Highest PageRank", &citations.highest_pagerank);
    print_ranking("Degree centrality", &authors.top_by_degree_centrality);
    print_metric_ranking("Betweenness centrality", &authors.top_by_betweenness_centrality);

    Ok(())
}

/// Export a graph to JSON.
pub fn export(ctx: &Context, kind: GraphKind, output: &Path) -> Result<()> {
    let analyzer = ctx.analyzer()?;

    let (json, nodes, edges) = match kind {
        GraphKind::Citation => {
            let export = analyzer.build_citation_graph()?.export();
            (
                serde_json::to_string_pretty(&export)?,
                export.nodes.len(),
                export.edges.len(),
            )
        }
        GraphKind::Collaboration => {
            let export = analyzer.build_collaboration_graph()?.export();
            (
                serde_json::to_string_pretty(&export)?,
                export.nodes.len(),
                export.edges.len(),
            )
        }
    };

    fs::write(output, json)?;
    println!(
        "{} Exported {} nodes and {} edges to {}",
        "✓".green(),
        nodes,
        edges,
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"top_k": 2}"#).unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.author_top_k, 10);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.json");
        assert!(load_config(Some(absent.as_path())).is_err());
    }

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path()).unwrap();

        let written = AnalysisConfig::from_file(dir.path().join(".bibnet/config.json")).unwrap();
        assert_eq!(written, AnalysisConfig::default());
    }

    #[test]
    fn test_import_then_analyze() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus.json");
        fs::write(
            &corpus,
            r#"{
                "documents": [
                    {"id": 1, "title": "D1", "authors": ["Smith", "Jones"]},
                    {"id": 2, "title": "D2", "authors": ["Jones", "Lee"]}
                ],
                "citations": [
                    {"citing_document_id": 1, "cited_document_id": 2, "citation_text": "D2"}
                ]
            }"#,
        )
        .unwrap();

        let ctx = Context {
            json: true,
            corpus: None,
            store: dir.path().join("store"),
            config: AnalysisConfig::default(),
        };
        import(&ctx, &corpus, false).unwrap();

        let analyzer = ctx.analyzer().unwrap();
        assert_eq!(analyzer.citation_overview().unwrap().total_citations, 1);
        assert_eq!(
            analyzer.most_collaborative_authors(1).unwrap()[0].name,
            "Jones"
        );
    }

    #[test]
    fn test_missing_store_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            json: false,
            corpus: None,
            store: dir.path().join("nowhere"),
            config: AnalysisConfig::default(),
        };
        assert!(ctx.analyzer().is_err());
    }
}
