//! The rule collection and its per-request adapter.
//!
//! A [`Map`] owns the rules, the converter registry and the compiled
//! matcher. Binding a map to a server context yields a [`MapAdapter`],
//! a cheap per-request view offering `match_request` and `build`.
//! Mutation requires `&mut Map`, so sharing a map between request
//! handlers after setup is safe without locking.

use {
    crate::{
        converters::{default_converters, Converter, ConverterArgs, ConverterFactory, Values},
        error::{BuildError, MatchError},
        matcher::{Matcher, Mismatch},
        rule::{BoundRule, Rule},
        util::similarity,
    },
    failure::Error,
    http::{Method, StatusCode},
    indexmap::{IndexMap, IndexSet},
    std::{fmt, sync::Arc},
    url::percent_encoding::{utf8_percent_encode, DEFAULT_ENCODE_SET},
};

/// Map-wide matching defaults, resolved into every rule at bind time.
#[derive(Debug, Clone)]
pub(crate) struct MapConfig {
    pub(crate) default_subdomain: String,
    pub(crate) host_matching: bool,
    pub(crate) strict_slashes: bool,
    pub(crate) merge_slashes: bool,
    pub(crate) redirect_defaults: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            default_subdomain: String::new(),
            host_matching: false,
            strict_slashes: true,
            merge_slashes: true,
            redirect_defaults: true,
        }
    }
}

/// The collection of URL rules.
///
/// ```
/// use rosen::{Map, Rule};
///
/// let mut map = Map::new();
/// map.add(Rule::new("/", "index")).unwrap();
/// map.add(Rule::new("/page/<int:page>", "page")).unwrap();
/// map.update();
///
/// let urls = map.bind("example.com").finish().unwrap();
/// let (rule, values) = urls.match_request(Some("/page/2"), None, None, false).unwrap();
/// assert_eq!(rule.endpoint(), "page");
/// assert_eq!(values["page"], rosen::Value::Int(2));
/// ```
pub struct Map {
    pub(crate) config: MapConfig,
    converters: IndexMap<String, ConverterFactory>,
    pub(crate) rules: Vec<BoundRule>,
    pub(crate) rules_by_endpoint: IndexMap<String, Vec<usize>>,
    pub(crate) matcher: Matcher,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .finish()
    }
}

impl Map {
    pub fn new() -> Self {
        let config = MapConfig::default();
        let matcher = Matcher::new(config.merge_slashes, config.redirect_defaults);
        Map {
            config,
            converters: default_converters(),
            rules: vec![],
            rules_by_endpoint: IndexMap::new(),
            matcher,
        }
    }

    /// The subdomain assumed for rules that do not set one. Configure
    /// before adding rules.
    pub fn default_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.config.default_subdomain = subdomain.into();
        self
    }

    /// Match full hosts instead of subdomains.
    pub fn host_matching(mut self, host_matching: bool) -> Self {
        self.config.host_matching = host_matching;
        self
    }

    /// The map-wide trailing slash default, overridable per rule.
    pub fn strict_slashes(mut self, strict_slashes: bool) -> Self {
        self.config.strict_slashes = strict_slashes;
        self
    }

    /// The map-wide slash merging default, overridable per rule.
    pub fn merge_slashes(mut self, merge_slashes: bool) -> Self {
        self.config.merge_slashes = merge_slashes;
        self.matcher.merge_slashes = merge_slashes;
        self
    }

    /// Whether matches covered by a sibling rule's defaults redirect to
    /// that rule's canonical URL.
    pub fn redirect_defaults(mut self, redirect_defaults: bool) -> Self {
        self.config.redirect_defaults = redirect_defaults;
        self.matcher.redirect_defaults = redirect_defaults;
        self
    }

    /// Registers (or overrides) a converter factory under `name`.
    pub fn converter<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ConverterArgs) -> Result<Box<dyn Converter>, Error> + Send + Sync + 'static,
    {
        self.converters.insert(name.into(), Arc::new(factory));
        self
    }

    /// Binds, compiles and registers a rule. Configuration problems
    /// (pattern syntax, unknown converters, conflicting rules) are
    /// reported here and never reach matching.
    pub fn add(&mut self, rule: Rule) -> Result<(), Error> {
        let index = self.rules.len();
        let bound = BoundRule::bind(rule, index, &self.config, &self.converters)?;

        if !bound.rule.build_only {
            for existing in &self.rules {
                if existing.rule.build_only {
                    continue;
                }
                if existing.same_shape(&bound)
                    && existing.rule.websocket == bound.rule.websocket
                    && methods_overlap(&existing.methods, &bound.methods)
                {
                    failure::bail!(
                        "the rule {:?} is indistinguishable from the already registered {:?}",
                        bound.rule.pattern(),
                        existing.rule.pattern()
                    );
                }
            }
            self.matcher.add(index, &bound);
        }

        let key = bound.build_compare_key();
        let bucket = self
            .rules_by_endpoint
            .entry(bound.rule.endpoint().to_owned())
            .or_insert_with(Vec::new);
        let rules = &self.rules;
        let position = bucket
            .iter()
            .position(|&i| rules[i].build_compare_key() > key)
            .unwrap_or_else(|| bucket.len());
        bucket.insert(position, index);

        self.rules.push(bound);
        Ok(())
    }

    /// Re-establishes the sorted views after a batch of `add` calls.
    /// Insertion keeps them consistent already, so calling this any
    /// number of times changes nothing.
    pub fn update(&mut self) {
        self.matcher.update();
        let Map {
            ref rules,
            ref mut rules_by_endpoint,
            ..
        } = *self;
        for bucket in rules_by_endpoint.values_mut() {
            bucket.sort_by_key(|&index| rules[index].build_compare_key());
        }
        log::debug!(
            "updated URL map: {} rules across {} endpoints",
            self.rules.len(),
            self.rules_by_endpoint.len()
        );
    }

    /// Iterates the registered rules in declaration order.
    pub fn iter_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(|bound| &bound.rule)
    }

    /// Whether any rule is registered under `endpoint`.
    pub fn has_endpoint(&self, endpoint: &str) -> bool {
        self.rules_by_endpoint.contains_key(endpoint)
    }

    /// Starts binding this map to a server context.
    pub fn bind(&self, server_name: impl Into<String>) -> Binder<'_> {
        Binder {
            map: self,
            server_name: server_name.into(),
            script_name: "/".to_owned(),
            subdomain: None,
            url_scheme: "http".to_owned(),
            default_method: Method::GET,
            path_info: "/".to_owned(),
            query_args: None,
        }
    }
}

fn methods_overlap(a: &Option<IndexSet<Method>>, b: &Option<IndexSet<Method>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.iter().any(|method| b.contains(method)),
        _ => true,
    }
}

/// Builder for a [`MapAdapter`], carrying the request-context fields.
#[derive(Debug)]
pub struct Binder<'a> {
    map: &'a Map,
    server_name: String,
    script_name: String,
    subdomain: Option<String>,
    url_scheme: String,
    default_method: Method,
    path_info: String,
    query_args: Option<String>,
}

impl<'a> Binder<'a> {
    /// The mount point of the application, prepended to every built and
    /// redirected URL.
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    pub fn url_scheme(mut self, url_scheme: impl Into<String>) -> Self {
        self.url_scheme = url_scheme.into();
        self
    }

    pub fn default_method(mut self, method: Method) -> Self {
        self.default_method = method;
        self
    }

    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = path_info.into();
        self
    }

    /// An already encoded query string, echoed on redirects.
    pub fn query_args(mut self, query_args: impl Into<String>) -> Self {
        self.query_args = Some(query_args.into());
        self
    }

    pub fn finish(self) -> Result<MapAdapter<'a>, Error> {
        if self.map.config.host_matching && self.subdomain.is_some() {
            failure::bail!("subdomain matching cannot be combined with host matching");
        }

        let server_name = normalize_server_name(&self.server_name, &self.url_scheme);
        let subdomain = match self.subdomain {
            Some(subdomain) => subdomain.to_lowercase(),
            None => self.map.config.default_subdomain.clone(),
        };

        Ok(MapAdapter {
            map: self.map,
            server_name,
            script_name: self.script_name,
            subdomain,
            url_scheme: self.url_scheme,
            default_method: self.default_method,
            path_info: self.path_info,
            query_args: self.query_args,
        })
    }
}

fn normalize_server_name(server_name: &str, url_scheme: &str) -> String {
    let server_name = server_name.to_lowercase();
    if let Some(colon) = server_name.rfind(':') {
        let standard_port = match url_scheme {
            "http" | "ws" => "80",
            "https" | "wss" => "443",
            _ => "",
        };
        if &server_name[colon + 1..] == standard_port {
            return server_name[..colon].to_owned();
        }
    }
    server_name
}

/// The result of [`MapAdapter::dispatch`].
#[derive(Debug)]
pub enum Dispatch<T> {
    /// The view function ran; this is its result.
    Handled(T),
    /// The request must be redirected instead of handled.
    Redirect { location: String, status: StatusCode },
}

/// A map bound to one request's server context.
#[derive(Debug)]
pub struct MapAdapter<'a> {
    map: &'a Map,
    server_name: String,
    script_name: String,
    subdomain: String,
    url_scheme: String,
    default_method: Method,
    path_info: String,
    query_args: Option<String>,
}

impl<'a> MapAdapter<'a> {
    /// Resolves a request tuple to `(rule, values)`. Arguments left as
    /// `None` fall back to the bound context.
    pub fn match_request(
        &self,
        path_info: Option<&str>,
        method: Option<Method>,
        query_args: Option<&str>,
        websocket: bool,
    ) -> Result<(&'a Rule, Values), MatchError> {
        let raw_path = path_info.unwrap_or(&self.path_info);
        let path = if raw_path.starts_with('/') {
            raw_path.to_owned()
        } else {
            format!("/{}", raw_path)
        };
        let method = method.unwrap_or_else(|| self.default_method.clone());
        let query_args = query_args.or_else(|| self.query_args.as_ref().map(String::as_str));
        let domain: &str = if self.map.config.host_matching {
            &self.server_name
        } else {
            &self.subdomain
        };

        match self
            .map
            .matcher
            .match_path(&self.map.rules, domain, &path, &method, websocket)
        {
            Ok((index, values)) => {
                if self.map.config.redirect_defaults {
                    if let Some(location) =
                        self.default_redirect(index, &method, &values, query_args)
                    {
                        return Err(MatchError::RequestRedirect {
                            location,
                            status: StatusCode::PERMANENT_REDIRECT,
                        });
                    }
                }
                Ok((&self.map.rules[index].rule, values))
            }
            Err(Mismatch::RequestPath { path }) => {
                let encoded = utf8_percent_encode(&path, DEFAULT_ENCODE_SET).to_string();
                Err(MatchError::RequestRedirect {
                    location: self.make_redirect_url(&encoded, query_args, None),
                    status: StatusCode::PERMANENT_REDIRECT,
                })
            }
            Err(Mismatch::AliasRedirect { endpoint, values }) => {
                match self.make_alias_redirect_url(&endpoint, &values, &method, query_args) {
                    Ok(location) => Err(MatchError::RequestRedirect {
                        location,
                        status: StatusCode::PERMANENT_REDIRECT,
                    }),
                    Err(error) => {
                        log::error!(
                            "no canonical URL for the alias endpoint {:?}: {}",
                            endpoint,
                            error
                        );
                        Err(MatchError::NotFound)
                    }
                }
            }
            Err(Mismatch::NoMatch {
                allowed,
                websocket_mismatch,
            }) => {
                if !allowed.is_empty() {
                    let mut allowed: Vec<Method> = allowed.into_iter().collect();
                    allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                    Err(MatchError::MethodNotAllowed { allowed })
                } else if websocket_mismatch {
                    Err(MatchError::WebsocketMismatch)
                } else {
                    Err(MatchError::NotFound)
                }
            }
        }
    }

    /// Whether the path resolves at all (redirects count as resolving).
    pub fn test(&self, path_info: Option<&str>, method: Option<Method>) -> bool {
        match self.match_request(path_info, method, None, false) {
            Ok(..) => true,
            Err(MatchError::RequestRedirect { .. }) => true,
            Err(..) => false,
        }
    }

    /// The `Allow` list for a path, across every rule that shares its
    /// shape.
    pub fn allowed_methods(&self, path_info: Option<&str>) -> Vec<Method> {
        let probe = Method::from_bytes(b"--").expect("a probe method that no rule accepts");
        match self.match_request(path_info, Some(probe), None, false) {
            Err(MatchError::MethodNotAllowed { allowed }) => allowed,
            _ => vec![],
        }
    }

    /// Matches the request and hands `(rule, values)` to `view`,
    /// converting redirect signals into a [`Dispatch::Redirect`] value
    /// instead of an error.
    pub fn dispatch<T>(
        &self,
        view: impl FnOnce(&Rule, &Values) -> T,
        path_info: Option<&str>,
        method: Option<Method>,
    ) -> Result<Dispatch<T>, MatchError> {
        match self.match_request(path_info, method, None, false) {
            Ok((rule, values)) => Ok(Dispatch::Handled(view(rule, &values))),
            Err(MatchError::RequestRedirect { location, status }) => {
                Ok(Dispatch::Redirect { location, status })
            }
            Err(error) => Err(error),
        }
    }

    /// Builds a URL for `endpoint` from the given values: the inverse
    /// of `match_request`.
    ///
    /// Candidate rules are tried preferring an exact method match, then
    /// GET, then any. The result is host-relative unless the target
    /// lives on another subdomain/host, the rule is a websocket rule,
    /// or `force_external` is set. With `append_unknown`, values not
    /// consumed by the pattern become the query string.
    pub fn build(
        &self,
        endpoint: &str,
        values: Option<&Values>,
        method: Option<&Method>,
        force_external: bool,
        append_unknown: bool,
    ) -> Result<String, BuildError> {
        let empty = Values::new();
        let values = values.unwrap_or(&empty);

        let (index, domain_part, path) =
            match self.partial_build(endpoint, values, method, append_unknown)? {
                Some(built) => built,
                None => return Err(self.build_error(endpoint, values, method)),
            };
        let rule = &self.map.rules[index];

        let mut url_scheme = self.url_scheme.as_str();
        let mut force_external = force_external;
        if rule.rule.is_websocket() {
            url_scheme = match url_scheme {
                "https" | "wss" => "wss",
                _ => "ws",
            };
            force_external = true;
        }

        let host = self.get_host(Some(domain_part.as_str()));
        let same_place = if self.map.config.host_matching {
            host == self.server_name
        } else {
            domain_part == self.subdomain
        };
        if !force_external && same_place {
            let script = self.script_name.trim_end_matches('/');
            return Ok(format!("{}/{}", script, path.trim_start_matches('/')));
        }

        let script = self.script_name.trim_matches('/');
        Ok(if script.is_empty() {
            format!(
                "{}://{}/{}",
                url_scheme,
                host,
                path.trim_start_matches('/')
            )
        } else {
            format!(
                "{}://{}/{}/{}",
                url_scheme,
                host,
                script,
                path.trim_start_matches('/')
            )
        })
    }

    fn partial_build(
        &self,
        endpoint: &str,
        values: &Values,
        method: Option<&Method>,
        append_unknown: bool,
    ) -> Result<Option<(usize, String, String)>, BuildError> {
        // a GET rule is the preferred target when no method is given
        if method.is_none() {
            if let Some(built) =
                self.try_build(endpoint, values, Some(&Method::GET), append_unknown)?
            {
                return Ok(Some(built));
            }
        }
        self.try_build(endpoint, values, method, append_unknown)
    }

    fn try_build(
        &self,
        endpoint: &str,
        values: &Values,
        method: Option<&Method>,
        append_unknown: bool,
    ) -> Result<Option<(usize, String, String)>, BuildError> {
        let bucket = match self.map.rules_by_endpoint.get(endpoint) {
            Some(bucket) => bucket,
            None => return Ok(None),
        };
        for &index in bucket {
            let rule = &self.map.rules[index];
            if !rule.suitable_for(values, method) {
                continue;
            }
            if let Some((domain_part, path)) = rule.build_path(values, append_unknown)? {
                return Ok(Some((index, domain_part, path)));
            }
        }
        Ok(None)
    }

    fn build_error(&self, endpoint: &str, values: &Values, method: Option<&Method>) -> BuildError {
        match self.map.rules_by_endpoint.get(endpoint) {
            None => BuildError::UnknownEndpoint {
                endpoint: endpoint.to_owned(),
                suggestion: self.closest_endpoint(endpoint, values, method),
            },
            Some(bucket) => {
                let mut best: Option<Vec<String>> = None;
                for &index in bucket {
                    let rule = &self.map.rules[index];
                    let missing: Vec<String> = rule
                        .arguments
                        .iter()
                        .filter(|name| {
                            !values.contains_key(*name)
                                && rule
                                    .rule
                                    .defaults
                                    .as_ref()
                                    .map_or(true, |defaults| !defaults.contains_key(*name))
                        })
                        .cloned()
                        .collect();
                    if best.as_ref().map_or(true, |b| missing.len() < b.len()) {
                        best = Some(missing);
                    }
                }
                BuildError::MissingValues {
                    endpoint: endpoint.to_owned(),
                    missing: best.unwrap_or_default(),
                }
            }
        }
    }

    fn closest_endpoint(
        &self,
        endpoint: &str,
        values: &Values,
        method: Option<&Method>,
    ) -> Option<String> {
        let mut best: Option<(f64, &str)> = None;
        for rule in &self.map.rules {
            let mut score = 0.98 * similarity(rule.rule.endpoint(), endpoint);
            if values.keys().all(|key| rule.arguments.contains(key)) {
                score += 0.01;
            }
            if let (Some(method), Some(methods)) = (method, &rule.methods) {
                if methods.contains(method) {
                    score += 0.01;
                }
            }
            if best.map_or(true, |(existing, _)| score > existing) {
                best = Some((score, rule.rule.endpoint()));
            }
        }
        match best {
            Some((_, found)) if found != endpoint => Some(found.to_owned()),
            _ => None,
        }
    }

    /// A redirect target when a sibling rule's defaults cover the
    /// matched values, keeping the canonical URL singular.
    fn default_redirect(
        &self,
        index: usize,
        method: &Method,
        values: &Values,
        query_args: Option<&str>,
    ) -> Option<String> {
        let rule = &self.map.rules[index];
        let bucket = self.map.rules_by_endpoint.get(rule.rule.endpoint())?;
        for &other_index in bucket {
            // only rules sorted ahead of the matched one are canonical
            if other_index == index {
                break;
            }
            let other = &self.map.rules[other_index];
            if !other.provides_defaults_for(rule) || !other.suitable_for(values, Some(method)) {
                continue;
            }
            let mut merged = values.clone();
            if let Some(defaults) = &other.rule.defaults {
                for (key, value) in defaults {
                    merged.insert(key.clone(), value.clone());
                }
            }
            if let Ok(Some((domain_part, path))) = other.build_path(&merged, false) {
                return Some(self.make_redirect_url(
                    &path,
                    query_args,
                    Some(domain_part.as_str()),
                ));
            }
        }
        None
    }

    fn make_alias_redirect_url(
        &self,
        endpoint: &str,
        values: &Values,
        method: &Method,
        query_args: Option<&str>,
    ) -> Result<String, BuildError> {
        let mut url = self.build(endpoint, Some(values), Some(method), true, false)?;
        if let Some(query_args) = query_args {
            if !query_args.is_empty() {
                url.push('?');
                url.push_str(query_args);
            }
        }
        Ok(url)
    }

    fn make_redirect_url(
        &self,
        path_info: &str,
        query_args: Option<&str>,
        domain_part: Option<&str>,
    ) -> String {
        let suffix = match query_args {
            Some(query_args) if !query_args.is_empty() => format!("?{}", query_args),
            _ => String::new(),
        };
        let host = self.get_host(domain_part);
        let script = self.script_name.trim_matches('/');
        let path = path_info.trim_start_matches('/');
        if script.is_empty() {
            format!("{}://{}/{}{}", self.url_scheme, host, path, suffix)
        } else {
            format!("{}://{}/{}/{}{}", self.url_scheme, host, script, path, suffix)
        }
    }

    fn get_host(&self, domain_part: Option<&str>) -> String {
        if self.map.config.host_matching {
            match domain_part {
                Some(host) if !host.is_empty() => host.to_owned(),
                _ => self.server_name.clone(),
            }
        } else {
            let subdomain = domain_part.unwrap_or(&self.subdomain);
            if subdomain.is_empty() {
                self.server_name.clone()
            } else {
                format!("{}.{}", subdomain, self.server_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::Value, matches::assert_matches};

    #[test]
    fn duplicate_shape_is_rejected_at_add_time() {
        let mut map = Map::new();
        map.add(Rule::new("/foo", "a")).unwrap();
        assert!(map.add(Rule::new("/foo", "b")).is_err());
        // a different method set keeps the rules distinguishable
        let mut map = Map::new();
        map.add(Rule::new("/foo", "a").methods(&["GET"])).unwrap();
        map.add(Rule::new("/foo", "b").methods(&["POST"])).unwrap();
    }

    #[test]
    fn duplicate_shape_spans_converters() {
        let mut map = Map::new();
        map.add(Rule::new("/item/<int:id>", "a")).unwrap();
        assert!(map.add(Rule::new("/item/<int:id>", "b")).is_err());
        // differing converters give a different shape
        map.add(Rule::new("/item/<name>", "c")).unwrap();
    }

    #[test]
    fn build_only_rules_do_not_conflict() {
        let mut map = Map::new();
        map.add(Rule::new("/foo", "a")).unwrap();
        map.add(Rule::new("/foo", "b").build_only(true)).unwrap();
    }

    #[test]
    fn binder_validates_host_matching() {
        let map = Map::new().host_matching(true);
        assert!(map.bind("example.com").subdomain("kb").finish().is_err());
    }

    #[test]
    fn binder_normalizes_the_server_name() {
        let map = Map::new();
        let adapter = map.bind("Example.COM:80").finish().unwrap();
        assert_eq!(adapter.server_name, "example.com");
        let adapter = map
            .bind("example.com:8080")
            .url_scheme("http")
            .finish()
            .unwrap();
        assert_eq!(adapter.server_name, "example.com:8080");
        let adapter = map
            .bind("example.com:443")
            .url_scheme("https")
            .finish()
            .unwrap();
        assert_eq!(adapter.server_name, "example.com");
    }

    #[test]
    fn custom_converters_register_per_map() {
        use crate::error::{BuildValueError, ValidationError};

        #[derive(Debug)]
        struct UpperConverter;

        impl Converter for UpperConverter {
            fn regex(&self) -> &str {
                "[A-Z]+"
            }

            fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
                Ok(Value::String(raw.to_owned()))
            }

            fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
                Ok(value.to_string().to_uppercase())
            }
        }

        let mut map = Map::new().converter("upper", |_args| Ok(Box::new(UpperConverter)));
        map.add(Rule::new("/tag/<upper:tag>", "tag")).unwrap();
        map.update();

        let urls = map.bind("example.com").finish().unwrap();
        let (_, values) = urls
            .match_request(Some("/tag/RUST"), None, None, false)
            .unwrap();
        assert_eq!(values["tag"], Value::from("RUST"));
        assert_matches!(
            urls.match_request(Some("/tag/rust"), None, None, false),
            Err(MatchError::NotFound)
        );

        // the default registry is untouched
        let mut other = Map::new();
        assert!(other.add(Rule::new("/tag/<upper:tag>", "tag")).is_err());
    }

    #[test]
    fn update_is_idempotent() {
        let mut map = Map::new();
        map.add(Rule::new("/", "index")).unwrap();
        map.add(Rule::new("/<name>", "dynamic")).unwrap();
        map.add(Rule::new("/fixed", "fixed")).unwrap();
        map.update();

        let first: Vec<String> = {
            let urls = map.bind("example.com").finish().unwrap();
            ["/", "/fixed", "/dynamic"]
                .iter()
                .map(|&path| {
                    let (rule, _) = urls.match_request(Some(path), None, None, false).unwrap();
                    rule.endpoint().to_owned()
                })
                .collect()
        };

        map.update();
        map.update();
        let urls = map.bind("example.com").finish().unwrap();
        let second: Vec<String> = ["/", "/fixed", "/dynamic"]
            .iter()
            .map(|&path| {
                let (rule, _) = urls.match_request(Some(path), None, None, false).unwrap();
                rule.endpoint().to_owned()
            })
            .collect();
        assert_eq!(first, second);
    }
}
