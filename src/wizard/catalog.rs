//! Environment variables the bundled skills read

use secrecy::SecretString;

/// One configurable environment variable
#[derive(Debug, Clone)]
pub struct EnvVarSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub reference_url: Option<&'static str>,
    /// An empty answer is silently accepted
    pub optional: bool,
    /// Read with hidden input
    pub secret: bool,
    /// Only asked when this sibling in the same group has a value
    pub requires: Option<&'static str>,
    /// Value found in the environment before prompting
    pub current_value: Option<String>,
    /// Value entered during this run
    pub provided_value: Option<SecretString>,
}

impl EnvVarSpec {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        EnvVarSpec {
            name,
            description,
            reference_url: None,
            optional: true,
            secret: false,
            requires: None,
            current_value: None,
            provided_value: None,
        }
    }

    pub fn url(mut self, url: &'static str) -> Self {
        self.reference_url = Some(url);
        self
    }

    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.optional = false;
        self
    }

    pub fn requires(mut self, sibling: &'static str) -> Self {
        self.requires = Some(sibling);
        self
    }

    /// Whether this variable has a value from either source
    pub fn has_value(&self) -> bool {
        self.current_value.is_some() || self.provided_value.is_some()
    }
}

/// Variables that belong together, e.g. one service's host and password
#[derive(Debug, Clone)]
pub struct EnvGroup {
    pub title: &'static str,
    pub vars: Vec<EnvVarSpec>,
}

impl EnvGroup {
    pub fn new(title: &'static str, vars: Vec<EnvVarSpec>) -> Self {
        EnvGroup { title, vars }
    }
}

/// The fixed, ordered catalog of variables the wizard manages
pub fn builtin_catalog() -> Vec<EnvGroup> {
    vec![
        EnvGroup::new(
            "GitLab",
            vec![
                EnvVarSpec::new("GITLAB_API_URL", "GitLab API URL (e.g. https://gitlab.example.com/api/v4)"),
                EnvVarSpec::new("GITLAB_TOKEN", "GitLab personal access token")
                    .url("https://docs.gitlab.com/ee/user/profile/personal_access_tokens.html")
                    .secret()
                    .required()
                    .requires("GITLAB_API_URL"),
            ],
        ),
        EnvGroup::new(
            "Confluence",
            vec![
                EnvVarSpec::new("CONFLUENCE_BASE_URL", "Confluence base URL"),
                EnvVarSpec::new("CONFLUENCE_USERNAME", "Confluence account email")
                    .requires("CONFLUENCE_BASE_URL"),
                EnvVarSpec::new("CONFLUENCE_API_TOKEN", "Confluence API token")
                    .url("https://id.atlassian.com/manage-profile/security/api-tokens")
                    .secret()
                    .required()
                    .requires("CONFLUENCE_BASE_URL"),
            ],
        ),
        EnvGroup::new(
            "Sentry",
            vec![
                EnvVarSpec::new("SENTRY_API_URL", "Sentry API URL"),
                EnvVarSpec::new("SENTRY_ORG", "Sentry organization slug").requires("SENTRY_API_URL"),
                EnvVarSpec::new("SENTRY_TOKEN", "Sentry auth token")
                    .url("https://docs.sentry.io/account/auth-tokens/")
                    .secret()
                    .requires("SENTRY_API_URL"),
            ],
        ),
        EnvGroup::new(
            "Mattermost",
            vec![
                EnvVarSpec::new("MATTERMOST_API_URL", "Mattermost API URL"),
                EnvVarSpec::new("MATTERMOST_TOKEN", "Mattermost personal access token")
                    .url("https://developers.mattermost.com/integrate/reference/personal-access-token/")
                    .secret()
                    .required()
                    .requires("MATTERMOST_API_URL"),
            ],
        ),
        EnvGroup::new(
            "Figma",
            vec![EnvVarSpec::new("FIGMA_API_KEY", "Figma personal access token")
                .url("https://www.figma.com/developers/api#access-tokens")
                .secret()],
        ),
        EnvGroup::new(
            "MySQL",
            vec![
                EnvVarSpec::new("MYSQL_HOST", "MySQL host"),
                EnvVarSpec::new("MYSQL_PORT", "MySQL port (default 3306)").requires("MYSQL_HOST"),
                EnvVarSpec::new("MYSQL_USERNAME", "MySQL user").requires("MYSQL_HOST"),
                EnvVarSpec::new("MYSQL_PASSWORD", "MySQL password")
                    .secret()
                    .required()
                    .requires("MYSQL_HOST"),
            ],
        ),
        EnvGroup::new(
            "Oracle",
            vec![
                EnvVarSpec::new("ORACLE_HOST", "Oracle host"),
                EnvVarSpec::new("ORACLE_PORT", "Oracle port (default 1521)").requires("ORACLE_HOST"),
                EnvVarSpec::new("ORACLE_SERVICE_NAME", "Oracle service name").requires("ORACLE_HOST"),
                EnvVarSpec::new("ORACLE_USERNAME", "Oracle user").requires("ORACLE_HOST"),
                EnvVarSpec::new("ORACLE_PASSWORD", "Oracle password")
                    .secret()
                    .required()
                    .requires("ORACLE_HOST"),
            ],
        ),
        EnvGroup::new(
            "Hiworks",
            vec![
                EnvVarSpec::new("HIWORKS_DOMAIN", "Hiworks company domain"),
                EnvVarSpec::new("HIWORKS_ID", "Hiworks login ID"),
                EnvVarSpec::new("HIWORKS_PWD", "Hiworks password")
                    .secret()
                    .required()
                    .requires("HIWORKS_ID"),
                EnvVarSpec::new("HIWORKS_OTP_SECRET", "Hiworks TOTP secret (only when OTP login is enabled)")
                    .secret()
                    .requires("HIWORKS_ID"),
                EnvVarSpec::new("HIWORKS_AUTH_MODE", "Hiworks auth mode: cookie, env or auto (default auto)")
                    .requires("HIWORKS_ID"),
            ],
        ),
        EnvGroup::new(
            "Elasticsearch",
            vec![
                EnvVarSpec::new("LDAP_USER", "LDAP account for the Kibana gateway"),
                EnvVarSpec::new("LDAP_PWD", "LDAP password")
                    .secret()
                    .required()
                    .requires("LDAP_USER"),
                EnvVarSpec::new("KIBANA_URL", "Kibana base URL").requires("LDAP_USER"),
            ],
        ),
        EnvGroup::new(
            "Obsidian",
            vec![EnvVarSpec::new("OBSIDIAN_PATH", "Path to your Obsidian vault")],
        ),
        EnvGroup::new(
            "Memory",
            vec![EnvVarSpec::new("MEMORY_FILE_PATH", "Path of the knowledge-graph memory file")],
        ),
    ]
}
