use crate::{
    MediaWikiClient,
    client::{ApiRequest, Endpoint, Transport},
    error::MediaWikiError,
};
use serde::Deserialize;
use std::fmt::Display;

/// Where an edit lands on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionRef {
    /// Append a new section
    New,
    /// Replace the section at this index
    Existing(String),
}

impl SectionRef {
    /// The value for the `section` parameter of `action=edit`
    pub fn as_param(&self) -> &str {
        match self {
            SectionRef::New => "new",
            SectionRef::Existing(index) => index.as_str(),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, SectionRef::New)
    }
}

impl Display for SectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Deserialize)]
struct Parse {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    level: String,
    line: String,
    index: String,
}

impl Parse {
    /// Last level 2 heading called `title`, the scan doesn't stop at the first match
    fn find_level_2(&self, title: &str) -> SectionRef {
        self.sections
            .iter()
            .rfind(|section| section.level == "2" && section.line == title)
            .map(|section| SectionRef::Existing(section.index.clone()))
            .unwrap_or(SectionRef::New)
    }
}

/// The markup to send when replacing an existing section
///
/// Editing a section by index replaces its heading too, so it is put back.
pub fn heading_prefixed(section: &SectionRef, section_title: &str, markup: &str) -> String {
    match section {
        SectionRef::New => markup.to_string(),
        SectionRef::Existing(_) => format!("== {section_title} ==\n\n{markup}"),
    }
}

impl<T: Transport> MediaWikiClient<T> {
    /// Find the level 2 section of `page` titled `section_title`
    ///
    /// A page that doesn't exist (`missingtitle`) has no sections, so it
    /// resolves to [SectionRef::New].
    ///
    /// # Errors
    ///
    /// This method fails if the request fails, the wiki reports any other
    /// error or `parse.sections` is malformed
    pub fn resolve_section(
        &self,
        endpoint: &Endpoint,
        page: &str,
        section_title: &str,
    ) -> Result<SectionRef, MediaWikiError> {
        let request = ApiRequest::get()
            .query("action", "parse")
            .query("page", page)
            .query("prop", "sections");

        let (response, _) = self.send(endpoint, &request)?;

        let section = match response.optional_field::<Parse>("parse")? {
            Some(parse) => parse.find_level_2(section_title),
            None => match response.error() {
                Some(error) if error.is_missing_title() => {
                    log::info!("Page '{page}' doesn't exist, it will be created");

                    SectionRef::New
                }
                Some(error) => {
                    log::warn!("Parsing '{page}' failed: {error}");

                    return Err(MediaWikiError::protocol("error", error));
                }
                None => SectionRef::New,
            },
        };

        log::debug!("Section '{section_title}' of '{page}' resolved to '{section}'");

        Ok(section)
    }
}
