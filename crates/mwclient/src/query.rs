use crate::{
    MediaWikiClient,
    client::{ApiRequest, Endpoint, Transport},
    error::MediaWikiError,
};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::{Map, Value};

/// One entry of a purge response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PurgedPage {
    #[serde(default)]
    pub ns: i64,
    pub title: String,
    // Both are flags, present ("" or true) when set
    #[serde(default, deserialize_with = "flag")]
    pub purged: bool,
    #[serde(default, deserialize_with = "flag")]
    pub missing: bool,
}

fn flag<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(set) => set,
        Value::Null => false,
        _ => true,
    })
}

#[derive(Deserialize)]
struct Titled {
    title: String,
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
struct ExternalLinks {
    #[serde(default)]
    externallinks: Vec<String>,
}

impl<T: Transport> MediaWikiClient<T> {
    /// Purge the cache of the given pages
    ///
    /// # Errors
    ///
    /// This method fails if no titles are given, the request fails, or the
    /// wiki doesn't answer with one entry per title
    pub fn purge<S: AsRef<str>>(
        &self,
        endpoint: &Endpoint,
        titles: &[S],
    ) -> Result<Vec<PurgedPage>, MediaWikiError> {
        if titles.is_empty() {
            return Err(MediaWikiError::InvalidArgument(
                "Purge needs at least one title".to_string(),
            ));
        }

        let request = ApiRequest::post()
            .query("action", "purge")
            .query("titles", titles.iter().map(|title| title.as_ref()).join("|"));

        let (response, _) = self.send(endpoint, &request)?;

        if let Some(error) = response.error() {
            return Err(MediaWikiError::protocol("error", error));
        }

        let purged = response
            .optional_field::<Vec<PurgedPage>>("purge")?
            .unwrap_or_default();

        if purged.len() != titles.len() {
            return Err(MediaWikiError::protocol(
                "purge",
                format!(
                    "{} page(s) purged out of {} requested",
                    purged.len(),
                    titles.len()
                ),
            ));
        }

        Ok(purged)
    }

    /// Titles of the members of `Category:<category>`
    ///
    /// # Errors
    ///
    /// This method fails if the request fails or `query.categorymembers` is malformed
    pub fn category_members(
        &self,
        endpoint: &Endpoint,
        category: &str,
    ) -> Result<Vec<String>, MediaWikiError> {
        let request = ApiRequest::get()
            .query("action", "query")
            .query("list", "categorymembers")
            .query("cmtitle", format!("Category:{category}"));

        let (response, _) = self.send(endpoint, &request)?;

        let query = response.field::<Map<String, Value>>("query")?;

        let members: Vec<Titled> = query_list(&query, "categorymembers")?;

        Ok(members.into_iter().map(|member| member.title).collect())
    }

    /// External links used on a page, none for a page that doesn't exist
    ///
    /// # Errors
    ///
    /// This method fails if the request fails, the wiki reports an error
    /// other than `missingtitle` or `parse.externallinks` is malformed
    pub fn external_links(
        &self,
        endpoint: &Endpoint,
        page: &str,
    ) -> Result<Vec<String>, MediaWikiError> {
        let request = ApiRequest::get()
            .query("action", "parse")
            .query("page", page)
            .query("prop", "externallinks");

        let (response, _) = self.send(endpoint, &request)?;

        match response.optional_field::<ExternalLinks>("parse")? {
            Some(parse) => Ok(parse.externallinks),
            None => match response.error() {
                Some(error) if !error.is_missing_title() => {
                    log::warn!("No links for '{page}': {error}");

                    Err(MediaWikiError::protocol("error", error))
                }
                _ => Ok(Vec::new()),
            },
        }
    }

    /// Names of all users outside the bot group
    ///
    /// # Errors
    ///
    /// This method fails if the request fails or `query.allusers` is malformed
    pub fn users(&self, endpoint: &Endpoint) -> Result<Vec<String>, MediaWikiError> {
        let request = ApiRequest::get()
            .query("action", "query")
            .query("list", "allusers")
            .query("meta", "userinfo")
            .query("auexcludegroup", "bot")
            .query("aulimit", "max");

        let (response, _) = self.send(endpoint, &request)?;

        let query = response.field::<Map<String, Value>>("query")?;

        let users: Vec<Named> = query_list(&query, "allusers")?;

        Ok(users.into_iter().map(|user| user.name).collect())
    }
}

fn query_list<T: serde::de::DeserializeOwned>(
    query: &Map<String, Value>,
    list: &str,
) -> Result<Vec<T>, MediaWikiError> {
    let field = format!("query.{list}");

    let entries = query
        .get(list)
        .ok_or_else(|| MediaWikiError::protocol(&field, "missing"))?;

    Vec::<T>::deserialize(entries).map_err(|err| MediaWikiError::protocol(&field, err))
}
