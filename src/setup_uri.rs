use std::borrow::Cow;

use crate::UntisError;

const SETUP_SCHEME: &str = "untis";
const SETUP_HOST: &str = "setschool";

const URI_SERVER_QUERY: &str = "url";
const URI_SCHOOL_QUERY: &str = "school";
const URI_USER_QUERY: &str = "user";
const URI_KEY_QUERY: &str = "key";

/// Credentials carried by the QR code the mobile app scans when linking an
/// account, e.g. `untis://setschool?url=arche.webuntis.com&school=demo&user=jdoe&key=SECRET`.
#[derive(Clone, PartialEq)]
pub struct SetupUri {
    pub server: String,
    pub school: String,
    pub user: String,
    pub secret: String,
}

impl std::fmt::Debug for SetupUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupUri")
            .field("server", &self.server)
            .field("school", &self.school)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SetupUri {
    pub fn parse(uri: &str) -> Result<Self, UntisError> {
        let uri = url::Url::parse(uri).map_err(UntisError::UriParseError)?;

        let domain = uri.domain();
        if uri.scheme() != SETUP_SCHEME || domain != Some(SETUP_HOST) {
            return Err(UntisError::InvalidSetupUri(
                format!("{}://{}", uri.scheme(), domain.unwrap_or("None")),
                format!("{SETUP_SCHEME}://{SETUP_HOST}"),
            ));
        }

        let mut server = None;
        let mut school = None;
        let mut user = None;
        let mut secret = None;

        for params in uri.query_pairs() {
            let value = Some(params.1.to_string()).filter(|v| !v.is_empty());
            match params.0 {
                Cow::Borrowed(URI_SERVER_QUERY) => server = value,
                Cow::Borrowed(URI_SCHOOL_QUERY) => school = value,
                Cow::Borrowed(URI_USER_QUERY) => user = value,
                Cow::Borrowed(URI_KEY_QUERY) => secret = value,
                _ => (),
            }
        }

        Ok(Self {
            server: server.ok_or(UntisError::UriMissingField("server"))?,
            school: school.ok_or(UntisError::UriMissingField("school"))?,
            user: user.ok_or(UntisError::UriMissingField("user"))?,
            secret: secret.ok_or(UntisError::UriMissingField("secret"))?,
        })
    }
}
