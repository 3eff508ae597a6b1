//! Author lines and INSPIRE links shown next to a paper.

pub const INSPIRE_BASE_URL: &str = "https://inspirehep.net";

/// Number of authors shown before collapsing into "et al.".
pub const DEFAULT_AUTHOR_COUNT: usize = 3;

/// Short author line for a paper card.
///
/// Collaborations win over individual authors: large experiments list
/// thousands of names.
pub fn format_authors(authors: &[String], collaborations: &[String], count: usize) -> String {
    if !collaborations.is_empty() {
        return format!(
            "{} Collaboration{}",
            collaborations.join(", "),
            plural(collaborations.len())
        );
    }

    if authors.len() <= count {
        return authors.join(", ");
    }
    format!("{} et al.", authors[..count].join(", "))
}

/// Collaboration line for the paper header: "A", "A and B", "A, B and C".
pub fn join_collaborations(collaborations: &[String]) -> String {
    let names = match collaborations {
        [] => return String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    };
    format!("{} Collaboration{}", names, plural(collaborations.len()))
}

fn plural(n: usize) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// INSPIRE search for papers citing `paper_id`.
pub fn citations_url(paper_id: &str) -> String {
    format!("{}/literature?q=refersto%3Arecid%3A{}", INSPIRE_BASE_URL, paper_id)
}

pub fn literature_url(base: &str, paper_id: &str) -> String {
    format!("{}/literature/{}", base.trim_end_matches('/'), paper_id)
}

/// INSPIRE search for a collaboration's papers, with the name query-encoded.
pub fn collaboration_url(base: &str, collaboration: &str) -> Result<String, url::ParseError> {
    let query = format!("collaboration:{}", collaboration);
    let url = url::Url::parse_with_params(
        &format!("{}/literature", base.trim_end_matches('/')),
        &[("q", query.as_str())],
    )?;
    Ok(url.into())
}

pub fn arxiv_abs_url(arxiv_id: &str) -> String {
    format!("https://arxiv.org/abs/{}", arxiv_id)
}
