//! Rule patterns and their compiled form.
//!
//! A [`Rule`] is the declarative description of one routable URL: the
//! pattern mini-language (`/page/<int:page>`), the endpoint it maps to
//! and its matching constraints. Rules are plain cloneable values;
//! adding one to a [`Map`] compiles it into a [`BoundRule`] holding the
//! part sequence for the matcher and the trace used to build URLs back
//! out of values.
//!
//! [`Map`]: ../map/struct.Map.html

use {
    crate::{
        converters::{
            is_identifier, Converter, ConverterArgs, ConverterFactory, Value, Values,
        },
        error::{BuildError, BuildValueError},
        map::MapConfig,
        util::collapse_slashes,
    },
    failure::Error,
    http::Method,
    indexmap::{IndexMap, IndexSet},
    regex::Regex,
    url::percent_encoding::{utf8_percent_encode, DEFAULT_ENCODE_SET, PATH_SEGMENT_ENCODE_SET},
};

/// A declarative URL rule.
///
/// ```
/// use rosen::Rule;
///
/// let rule = Rule::new("/page/<int:page>", "page")
///     .methods(&["GET"])
///     .strict_slashes(false);
/// ```
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) pattern: String,
    pub(crate) endpoint: String,
    pub(crate) methods: Option<Vec<String>>,
    pub(crate) websocket: bool,
    pub(crate) defaults: Option<IndexMap<String, Value>>,
    pub(crate) subdomain: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) strict_slashes: Option<bool>,
    pub(crate) merge_slashes: Option<bool>,
    pub(crate) alias: bool,
    pub(crate) build_only: bool,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Rule {
            pattern: pattern.into(),
            endpoint: endpoint.into(),
            methods: None,
            websocket: false,
            defaults: None,
            subdomain: None,
            host: None,
            strict_slashes: None,
            merge_slashes: None,
            alias: false,
            build_only: false,
        }
    }

    /// Restricts the rule to the given HTTP methods. `HEAD` is implied
    /// wherever `GET` is allowed. Without this, the rule accepts any
    /// method.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = Some(
            methods
                .into_iter()
                .map(|m| m.as_ref().to_owned())
                .collect(),
        );
        self
    }

    /// Marks the rule as matching websocket handshakes instead of plain
    /// HTTP requests.
    pub fn websocket(mut self, websocket: bool) -> Self {
        self.websocket = websocket;
        self
    }

    /// Adds a default value, supplied when the variable is absent from
    /// the matched path and used to identify canonical redirect targets.
    pub fn default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Restricts the rule to a subdomain pattern (may itself contain
    /// placeholders).
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    /// Restricts the rule to a full host pattern, for maps doing host
    /// matching.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Overrides the map-wide trailing slash behavior for this rule.
    pub fn strict_slashes(mut self, strict_slashes: bool) -> Self {
        self.strict_slashes = Some(strict_slashes);
        self
    }

    /// Overrides the map-wide slash merging behavior for this rule.
    pub fn merge_slashes(mut self, merge_slashes: bool) -> Self {
        self.merge_slashes = Some(merge_slashes);
        self
    }

    /// Marks the rule as a non-canonical alternate that redirects to the
    /// canonical rule sharing its endpoint and defaults.
    pub fn alias(mut self, alias: bool) -> Self {
        self.alias = alias;
        self
    }

    /// Excludes the rule from matching; it is then only used to build
    /// URLs.
    pub fn build_only(mut self, build_only: bool) -> Self {
        self.build_only = build_only;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_websocket(&self) -> bool {
        self.websocket
    }

    pub fn is_alias(&self) -> bool {
        self.alias
    }

    pub fn is_build_only(&self) -> bool {
        self.build_only
    }
}

// ==== pattern tokenizer ====

#[derive(Debug, PartialEq)]
pub(crate) enum Token {
    Static(String),
    Placeholder {
        converter: String,
        args: Option<String>,
        name: String,
    },
}

/// Splits a pattern into literal runs and `<converter(args):name>`
/// placeholders. `<name>` is shorthand for the default converter.
pub(crate) fn parse_rule(pattern: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('<') {
        let (static_part, tail) = rest.split_at(open);
        if !static_part.is_empty() {
            if static_part.contains('>') {
                failure::bail!("malformed rule pattern {:?}", pattern);
            }
            tokens.push(Token::Static(static_part.to_owned()));
        }

        let close = tail
            .find('>')
            .ok_or_else(|| failure::format_err!("malformed rule pattern {:?}", pattern))?;
        tokens.push(parse_placeholder(&tail[1..close], pattern)?);
        rest = &tail[close + 1..];
    }

    if !rest.is_empty() {
        if rest.contains('<') || rest.contains('>') {
            failure::bail!("malformed rule pattern {:?}", pattern);
        }
        tokens.push(Token::Static(rest.to_owned()));
    }

    Ok(tokens)
}

fn parse_placeholder(inner: &str, pattern: &str) -> Result<Token, Error> {
    let (converter, args, name) = if let Some(paren) = inner.find('(') {
        let close = inner[paren..]
            .find(')')
            .map(|i| paren + i)
            .ok_or_else(|| {
                failure::format_err!(
                    "malformed rule pattern {:?}: unbalanced parentheses",
                    pattern
                )
            })?;
        let after = &inner[close + 1..];
        if !after.starts_with(':') {
            failure::bail!("malformed rule pattern {:?}", pattern);
        }
        (
            &inner[..paren],
            Some(inner[paren + 1..close].to_owned()),
            &after[1..],
        )
    } else if let Some(colon) = inner.find(':') {
        (&inner[..colon], None, &inner[colon + 1..])
    } else {
        ("default", None, inner)
    };

    if !is_identifier(converter) || !is_identifier(name) {
        failure::bail!("malformed rule pattern {:?}", pattern);
    }

    Ok(Token::Placeholder {
        converter: converter.to_owned(),
        args,
        name: name.to_owned(),
    })
}

// ==== compiled form ====

/// The specificity key for ordering dynamic transitions: more literal
/// text first, then longer literals, then more converters, then lower
/// (stricter) converter weights. Compared lexicographically, ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Weighting {
    pub(crate) static_count: i64,
    pub(crate) static_weights: Vec<(i64, i64)>,
    pub(crate) argument_count: i64,
    pub(crate) argument_weights: Vec<i64>,
}

/// One compiled token of a rule: a literal segment or a regex-driven
/// transition of the matcher.
#[derive(Clone, Debug)]
pub(crate) struct RulePart {
    pub(crate) content: String,
    pub(crate) names: Vec<String>,
    pub(crate) is_static: bool,
    /// A final part consumes every remaining segment in one transition.
    pub(crate) is_final: bool,
    /// A suffixed final part carries an optional trailing-slash group,
    /// re-injected as an empty segment so the redirect logic applies.
    pub(crate) suffixed: bool,
    pub(crate) weight: Weighting,
    pub(crate) regex: Option<Regex>,
}

impl RulePart {
    /// Whether two parts describe the same transition, so the matcher
    /// can share a trie edge between rules.
    pub(crate) fn same_edge(&self, other: &RulePart) -> bool {
        self.is_static == other.is_static
            && self.is_final == other.is_final
            && self.suffixed == other.suffixed
            && self.content == other.content
            && self.weight == other.weight
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TraceItem {
    pub(crate) dynamic: bool,
    pub(crate) content: String,
}

/// A rule bound to a map: resolved flags plus the compiled part
/// sequence (domain part first) and build traces.
#[derive(Debug)]
pub(crate) struct BoundRule {
    pub(crate) rule: Rule,
    pub(crate) index: usize,
    pub(crate) methods: Option<IndexSet<Method>>,
    pub(crate) strict_slashes: bool,
    pub(crate) merge_slashes: bool,
    pub(crate) parts: Vec<RulePart>,
    pub(crate) converters: IndexMap<String, Box<dyn Converter>>,
    pub(crate) arguments: IndexSet<String>,
    domain_trace: Vec<TraceItem>,
    path_trace: Vec<TraceItem>,
}

impl BoundRule {
    pub(crate) fn bind(
        rule: Rule,
        index: usize,
        config: &MapConfig,
        registry: &IndexMap<String, ConverterFactory>,
    ) -> Result<Self, Error> {
        if !rule.pattern.starts_with('/') {
            failure::bail!(
                "the rule pattern {:?} must begin with a slash",
                rule.pattern
            );
        }

        let methods = match &rule.methods {
            None => None,
            Some(names) => {
                let mut methods = IndexSet::new();
                for name in names {
                    let method = Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                        .map_err(|_| failure::format_err!("invalid HTTP method {:?}", name))?;
                    methods.insert(method);
                }
                if methods.contains(&Method::GET) {
                    methods.insert(Method::HEAD);
                }
                Some(methods)
            }
        };

        if rule.websocket {
            if let Some(methods) = &methods {
                let handshake_only = methods
                    .iter()
                    .all(|m| *m == Method::GET || *m == Method::HEAD || *m == Method::OPTIONS);
                if !handshake_only {
                    failure::bail!(
                        "websocket rules accept only the GET, HEAD and OPTIONS methods: {:?}",
                        rule.pattern
                    );
                }
            }
        }

        let strict_slashes = rule.strict_slashes.unwrap_or(config.strict_slashes);
        let merge_slashes = rule.merge_slashes.unwrap_or(config.merge_slashes);
        let is_leaf = !rule.pattern.ends_with('/');

        let domain_pattern = if config.host_matching {
            if rule.subdomain.is_some() {
                failure::bail!(
                    "the rule {:?} has a subdomain set, but the map matches full hosts",
                    rule.pattern
                );
            }
            rule.host.clone().unwrap_or_default()
        } else {
            if rule.host.is_some() {
                failure::bail!(
                    "the rule {:?} has a host set, but the map matches subdomains",
                    rule.pattern
                );
            }
            rule.subdomain
                .clone()
                .unwrap_or_else(|| config.default_subdomain.clone())
        };
        if domain_pattern.contains('/') {
            failure::bail!(
                "the subdomain or host pattern {:?} must not contain a slash",
                domain_pattern
            );
        }

        let mut compiler = Compiler::new(registry, merge_slashes);
        for token in parse_rule(&domain_pattern)? {
            compiler.feed(token)?;
        }
        compiler.finish_domain()?;
        for token in parse_rule(&rule.pattern)? {
            compiler.feed(token)?;
        }
        let compiled = compiler.finish(is_leaf)?;

        // defaults count as arguments of the rule, exactly like path
        // variables; candidate selection and canonical redirects rely
        // on that
        let mut arguments = compiled.arguments;
        if let Some(defaults) = &rule.defaults {
            for key in defaults.keys() {
                arguments.insert(key.clone());
            }
        }

        Ok(BoundRule {
            rule,
            index,
            methods,
            strict_slashes,
            merge_slashes,
            parts: compiled.parts,
            converters: compiled.converters,
            arguments,
            domain_trace: compiled.domain_trace,
            path_trace: compiled.path_trace,
        })
    }

    pub(crate) fn allows(&self, method: &Method) -> bool {
        self.methods
            .as_ref()
            .map_or(true, |methods| methods.contains(method))
    }

    /// Whether this rule can build a URL from the given values.
    pub(crate) fn suitable_for(&self, values: &Values, method: Option<&Method>) -> bool {
        if let (Some(method), Some(methods)) = (method, &self.methods) {
            if !methods.contains(method) {
                return false;
            }
        }

        let defaults = self.rule.defaults.as_ref();
        for key in &self.arguments {
            let has_default = defaults.map_or(false, |defaults| defaults.contains_key(key));
            if !has_default && !values.contains_key(key) {
                return false;
            }
        }
        if let Some(defaults) = defaults {
            for (key, value) in defaults {
                if let Some(given) = values.get(key) {
                    if given != value {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Whether a request matched by `other` should be redirected to the
    /// canonical URL of this rule instead.
    pub(crate) fn provides_defaults_for(&self, other: &BoundRule) -> bool {
        !self.rule.build_only
            && self.rule.defaults.is_some()
            && self.index != other.index
            && self.rule.endpoint == other.rule.endpoint
            && self.arguments == other.arguments
    }

    /// Sort key for the per-endpoint build candidate list: canonical
    /// rules before aliases, more arguments and more defaults first.
    pub(crate) fn build_compare_key(&self) -> (u8, i64, i64) {
        (
            if self.rule.alias { 1 } else { 0 },
            -(self.arguments.len() as i64),
            -(self.rule.defaults.as_ref().map_or(0, IndexMap::len) as i64),
        )
    }

    pub(crate) fn same_shape(&self, other: &BoundRule) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.same_edge(b))
    }

    /// Renders `(domain_part, path)` from the given values, percent
    /// encoding dynamic fragments. `Ok(None)` means this rule cannot
    /// render the values and the next candidate should be tried.
    pub(crate) fn build_path(
        &self,
        values: &Values,
        append_unknown: bool,
    ) -> Result<Option<(String, String)>, BuildError> {
        let domain = match self.render_trace(&self.domain_trace, values)? {
            Some(domain) => domain,
            None => return Ok(None),
        };
        let mut path = match self.render_trace(&self.path_trace, values)? {
            Some(path) => path,
            None => return Ok(None),
        };

        if append_unknown {
            let unknown: Vec<(&String, String)> = values
                .iter()
                .filter(|(key, _)| !self.arguments.contains(*key))
                .map(|(key, value)| (key, value.to_string()))
                .collect();
            if !unknown.is_empty() {
                let query = serde_urlencoded::to_string(&unknown).map_err(|e| {
                    BuildError::InvalidValue {
                        endpoint: self.rule.endpoint.clone(),
                        message: format!("could not encode the query string: {}", e),
                    }
                })?;
                path.push('?');
                path.push_str(&query);
            }
        }

        Ok(Some((domain, path)))
    }

    fn render_trace(
        &self,
        trace: &[TraceItem],
        values: &Values,
    ) -> Result<Option<String>, BuildError> {
        let mut rendered = String::new();
        for item in trace {
            if !item.dynamic {
                rendered.push_str(&item.content);
                continue;
            }

            let value = values.get(&item.content).or_else(|| {
                self.rule
                    .defaults
                    .as_ref()
                    .and_then(|defaults| defaults.get(&item.content))
            });
            let value = match value {
                Some(value) => value,
                None => return Ok(None),
            };
            let converter = self
                .converters
                .get(&item.content)
                .expect("every traced variable has a converter");
            match converter.to_url(value) {
                Ok(raw) => {
                    let encoded = if converter.part_isolating() {
                        utf8_percent_encode(&raw, PATH_SEGMENT_ENCODE_SET).to_string()
                    } else {
                        utf8_percent_encode(&raw, DEFAULT_ENCODE_SET).to_string()
                    };
                    rendered.push_str(&encoded);
                }
                Err(BuildValueError::Mismatch) => return Ok(None),
                Err(BuildValueError::Invalid(message)) => {
                    return Err(BuildError::InvalidValue {
                        endpoint: self.rule.endpoint.clone(),
                        message,
                    });
                }
            }
        }
        Ok(Some(rendered))
    }
}

// ==== compiler ====

enum Fragment {
    Literal(String),
    Group {
        name: String,
        regex: String,
        weight: i64,
    },
}

struct Compiled {
    parts: Vec<RulePart>,
    converters: IndexMap<String, Box<dyn Converter>>,
    arguments: IndexSet<String>,
    domain_trace: Vec<TraceItem>,
    path_trace: Vec<TraceItem>,
}

/// Walks the tokens of a rule, splitting them into segment-level parts.
/// The domain pattern compiles to exactly one part; path segments flush
/// at every slash until a non-isolating converter switches the
/// remainder into one final part.
struct Compiler<'a> {
    registry: &'a IndexMap<String, ConverterFactory>,
    merge_slashes: bool,
    domain_mode: bool,
    in_final: bool,
    parts: Vec<RulePart>,
    fragments: Vec<Fragment>,
    converters: IndexMap<String, Box<dyn Converter>>,
    arguments: IndexSet<String>,
    domain_trace: Vec<TraceItem>,
    path_trace: Vec<TraceItem>,
}

impl<'a> Compiler<'a> {
    fn new(registry: &'a IndexMap<String, ConverterFactory>, merge_slashes: bool) -> Self {
        Compiler {
            registry,
            merge_slashes,
            domain_mode: true,
            in_final: false,
            parts: vec![],
            fragments: vec![],
            converters: IndexMap::new(),
            arguments: IndexSet::new(),
            domain_trace: vec![],
            path_trace: vec![],
        }
    }

    fn feed(&mut self, token: Token) -> Result<(), Error> {
        match token {
            Token::Static(text) => self.literal(&text),
            Token::Placeholder {
                converter,
                args,
                name,
            } => self.placeholder(&converter, args.as_ref().map(String::as_str), &name),
        }
    }

    fn literal(&mut self, text: &str) -> Result<(), Error> {
        let text = if self.merge_slashes && !self.domain_mode {
            collapse_slashes(text)
        } else {
            text.to_owned()
        };
        self.trace_mut().push(TraceItem {
            dynamic: false,
            content: text.clone(),
        });

        if self.domain_mode || self.in_final {
            if !text.is_empty() {
                self.fragments.push(Fragment::Literal(text));
            }
            return Ok(());
        }

        let mut first = true;
        for segment in text.split('/') {
            if !first {
                self.flush_part()?;
            }
            first = false;
            if !segment.is_empty() {
                self.fragments.push(Fragment::Literal(segment.to_owned()));
            }
        }
        Ok(())
    }

    fn placeholder(
        &mut self,
        converter_name: &str,
        args: Option<&str>,
        name: &str,
    ) -> Result<(), Error> {
        let factory = self.registry.get(converter_name).ok_or_else(|| {
            failure::format_err!("the converter {:?} does not exist", converter_name)
        })?;
        let args = match args {
            Some(raw) => ConverterArgs::parse(raw)?,
            None => ConverterArgs::default(),
        };
        let converter = factory(&args)?;

        if !self.arguments.insert(name.to_owned()) {
            failure::bail!("the variable {:?} is used twice in one rule", name);
        }
        if !converter.part_isolating() {
            if self.domain_mode {
                failure::bail!(
                    "the converter {:?} can match a slash and cannot be used in a subdomain or host pattern",
                    converter_name
                );
            }
            self.in_final = true;
        }

        self.trace_mut().push(TraceItem {
            dynamic: true,
            content: name.to_owned(),
        });
        self.fragments.push(Fragment::Group {
            name: name.to_owned(),
            regex: converter.regex().to_owned(),
            weight: converter.weight(),
        });
        self.converters.insert(name.to_owned(), converter);
        Ok(())
    }

    fn trace_mut(&mut self) -> &mut Vec<TraceItem> {
        if self.domain_mode {
            &mut self.domain_trace
        } else {
            &mut self.path_trace
        }
    }

    fn finish_domain(&mut self) -> Result<(), Error> {
        self.flush_part()?;
        self.domain_mode = false;
        Ok(())
    }

    fn finish(mut self, is_leaf: bool) -> Result<Compiled, Error> {
        if self.in_final {
            let mut suffixed = false;
            if !is_leaf {
                // the trailing slash of the pattern sits in the last
                // literal fragment; it becomes an optional suffix group
                if let Some(Fragment::Literal(text)) = self.fragments.last_mut() {
                    if text.ends_with('/') {
                        text.pop();
                        if text.is_empty() {
                            self.fragments.pop();
                        }
                    }
                }
                suffixed = true;
            }
            let part = self.make_part(true, suffixed)?;
            self.parts.push(part);
            if !is_leaf {
                self.flush_part()?;
            }
        } else {
            self.flush_part()?;
        }

        Ok(Compiled {
            parts: self.parts,
            converters: self.converters,
            arguments: self.arguments,
            domain_trace: self.domain_trace,
            path_trace: self.path_trace,
        })
    }

    fn flush_part(&mut self) -> Result<(), Error> {
        let part = self.make_part(false, false)?;
        self.parts.push(part);
        Ok(())
    }

    fn make_part(&mut self, is_final: bool, suffixed: bool) -> Result<RulePart, Error> {
        let fragments = std::mem::replace(&mut self.fragments, vec![]);
        let position = self.parts.len() as i64;

        let dynamic = fragments.iter().any(|fragment| match fragment {
            Fragment::Group { .. } => true,
            Fragment::Literal(..) => false,
        });

        if !dynamic {
            let content: String = fragments
                .into_iter()
                .map(|fragment| match fragment {
                    Fragment::Literal(text) => text,
                    Fragment::Group { .. } => unreachable!(),
                })
                .collect();
            let weight = Weighting {
                static_count: -1,
                static_weights: vec![(position, -(content.len() as i64))],
                ..Weighting::default()
            };
            return Ok(RulePart {
                content,
                names: vec![],
                is_static: true,
                is_final: false,
                suffixed: false,
                weight,
                regex: None,
            });
        }

        let mut content = String::new();
        let mut names = vec![];
        let mut static_weights = vec![];
        let mut argument_weights = vec![];
        for fragment in fragments {
            match fragment {
                Fragment::Literal(text) => {
                    if !text.is_empty() {
                        static_weights.push((position, -(text.len() as i64)));
                    }
                    content.push_str(&regex::escape(&text));
                }
                Fragment::Group {
                    name,
                    regex,
                    weight,
                } => {
                    content.push_str(&format!("(?P<{}>{})", name, regex));
                    names.push(name);
                    argument_weights.push(weight);
                }
            }
        }
        if suffixed {
            content.push_str("(?P<__suffix__>/?)");
        }

        let regex = Regex::new(&format!("^{}$", content))
            .map_err(|e| failure::format_err!("could not compile the rule regex: {}", e))?;
        let weight = Weighting {
            static_count: -(static_weights.len() as i64),
            static_weights,
            argument_count: -(argument_weights.len() as i64),
            argument_weights,
        };

        Ok(RulePart {
            content,
            names,
            is_static: false,
            is_final,
            suffixed,
            weight,
            regex: Some(regex),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{converters::default_converters, map::MapConfig},
    };

    fn bind(rule: Rule) -> Result<BoundRule, Error> {
        BoundRule::bind(rule, 0, &MapConfig::default(), &default_converters())
    }

    macro_rules! t {
        ($(
            $name:ident ($pattern:expr, $expected:expr);
        )*) => {$(
            #[test]
            fn $name() {
                assert_eq!(parse_rule($pattern).unwrap(), $expected);
            }
        )*};
    }

    fn static_(s: &str) -> Token {
        Token::Static(s.to_owned())
    }

    fn placeholder(converter: &str, args: Option<&str>, name: &str) -> Token {
        Token::Placeholder {
            converter: converter.to_owned(),
            args: args.map(str::to_owned),
            name: name.to_owned(),
        }
    }

    t![
        parse_static_only(
            "/path/to/lib",
            vec![static_("/path/to/lib")]
        );
        parse_shorthand_placeholder(
            "/<name>",
            vec![static_("/"), placeholder("default", None, "name")]
        );
        parse_converter_placeholder(
            "/page/<int:page>",
            vec![static_("/page/"), placeholder("int", None, "page")]
        );
        parse_converter_with_args(
            "/<any(about, help):page_name>/",
            vec![
                static_("/"),
                placeholder("any", Some("about, help"), "page_name"),
                static_("/"),
            ]
        );
        parse_adjacent_placeholders(
            "/v<int:major>.<int:minor>",
            vec![
                static_("/v"),
                placeholder("int", None, "major"),
                static_("."),
                placeholder("int", None, "minor"),
            ]
        );
    ];

    #[test]
    fn parse_rule_failcase_unclosed_placeholder() {
        assert!(parse_rule("/<int:page").is_err());
    }

    #[test]
    fn parse_rule_failcase_stray_bracket() {
        assert!(parse_rule("/page>").is_err());
        assert!(parse_rule("/pa<ge").is_err());
    }

    #[test]
    fn parse_rule_failcase_unbalanced_args() {
        assert!(parse_rule("/<any(about:page>").is_err());
    }

    #[test]
    fn parse_rule_failcase_bad_names() {
        assert!(parse_rule("/<:page>").is_err());
        assert!(parse_rule("/<int:>").is_err());
        assert!(parse_rule("/<int:pa-ge>").is_err());
    }

    #[test]
    fn bind_static_rule_parts() {
        let bound = bind(Rule::new("/foo/bar", "foo")).unwrap();
        let contents: Vec<&str> = bound.parts.iter().map(|p| p.content.as_str()).collect();
        // domain part first, then one part per path segment
        assert_eq!(contents, ["", "", "foo", "bar"]);
        assert!(bound.parts.iter().all(|p| p.is_static));
    }

    #[test]
    fn bind_branch_rule_has_trailing_empty_part() {
        let bound = bind(Rule::new("/foo/", "foo")).unwrap();
        let contents: Vec<&str> = bound.parts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["", "", "foo", ""]);
    }

    #[test]
    fn bind_dynamic_rule_parts() {
        let bound = bind(Rule::new("/page/<int:page>", "page")).unwrap();
        assert_eq!(bound.parts.len(), 4);
        let part = &bound.parts[3];
        assert!(!part.is_static);
        assert!(!part.is_final);
        assert_eq!(part.content, r"(?P<page>\d+)");
        assert_eq!(part.names, ["page"]);
        assert_eq!(bound.arguments.len(), 1);
    }

    #[test]
    fn bind_mixed_segment_compiles_to_one_part() {
        let bound = bind(Rule::new("/v<int:major>.<int:minor>", "version")).unwrap();
        let part = bound.parts.last().unwrap();
        assert_eq!(part.content, r"v(?P<major>\d+)\.(?P<minor>\d+)");
        assert_eq!(part.names, ["major", "minor"]);
        assert_eq!(part.weight.argument_weights, [50, 50]);
    }

    #[test]
    fn bind_path_converter_folds_remainder_into_final_part() {
        let bound = bind(Rule::new("/files/<path:name>/edit", "edit")).unwrap();
        let part = bound.parts.last().unwrap();
        assert!(part.is_final);
        assert!(!part.suffixed);
        assert_eq!(part.content, "(?P<name>[^/].*?)/edit");
    }

    #[test]
    fn bind_final_part_with_trailing_slash_is_suffixed() {
        let bound = bind(Rule::new("/files/<path:name>/", "files")).unwrap();
        let final_part = &bound.parts[bound.parts.len() - 2];
        assert!(final_part.is_final);
        assert!(final_part.suffixed);
        assert_eq!(
            final_part.content,
            "(?P<name>[^/].*?)(?P<__suffix__>/?)"
        );
        // the trailing empty part keeps the redirect topology of plain
        // branch rules
        let last = bound.parts.last().unwrap();
        assert!(last.is_static && last.content.is_empty());
    }

    #[test]
    fn bind_merge_slashes_collapses_pattern() {
        let merged = bind(Rule::new("/foo//bar", "foo")).unwrap();
        let contents: Vec<&str> = merged.parts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["", "", "foo", "bar"]);

        let verbatim = bind(Rule::new("/foo//bar", "foo").merge_slashes(false)).unwrap();
        let contents: Vec<&str> = verbatim.parts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, ["", "", "foo", "", "bar"]);
    }

    #[test]
    fn bind_subdomain_part() {
        let bound = bind(Rule::new("/", "index").subdomain("kb")).unwrap();
        assert_eq!(bound.parts[0].content, "kb");
        assert!(bound.parts[0].is_static);
    }

    #[test]
    fn bind_failcase_duplicate_variable() {
        assert!(bind(Rule::new("/<id>/<id>", "dup")).is_err());
    }

    #[test]
    fn bind_failcase_unknown_converter() {
        assert!(bind(Rule::new("/<unknown:id>", "bad")).is_err());
    }

    #[test]
    fn bind_failcase_missing_leading_slash() {
        assert!(bind(Rule::new("foo", "bad")).is_err());
    }

    #[test]
    fn bind_failcase_websocket_methods() {
        assert!(bind(Rule::new("/ws", "ws").websocket(true).methods(&["POST"])).is_err());
        assert!(bind(Rule::new("/ws", "ws").websocket(true).methods(&["GET"])).is_ok());
    }

    #[test]
    fn bind_failcase_path_converter_in_subdomain() {
        assert!(bind(Rule::new("/", "bad").subdomain("<path:x>")).is_err());
    }

    #[test]
    fn bind_implies_head_for_get() {
        let bound = bind(Rule::new("/", "index").methods(&["get"])).unwrap();
        let methods = bound.methods.as_ref().unwrap();
        assert!(methods.contains(&Method::GET));
        assert!(methods.contains(&Method::HEAD));
    }

    #[test]
    fn weighting_orders_static_before_converters() {
        let static_heavy = Weighting {
            static_count: -1,
            static_weights: vec![(1, -4)],
            argument_count: -1,
            argument_weights: vec![100],
        };
        let dynamic_only = Weighting {
            static_count: 0,
            static_weights: vec![],
            argument_count: -1,
            argument_weights: vec![100],
        };
        let int_only = Weighting {
            static_count: 0,
            static_weights: vec![],
            argument_count: -1,
            argument_weights: vec![50],
        };
        assert!(static_heavy < dynamic_only);
        assert!(int_only < dynamic_only);
    }

    #[test]
    fn build_path_renders_and_encodes() {
        let bound = bind(Rule::new("/page/<page>", "page")).unwrap();
        let mut values = Values::new();
        values.insert("page".to_owned(), Value::from("hello world"));
        let (domain, path) = bound.build_path(&values, true).unwrap().unwrap();
        assert_eq!(domain, "");
        assert_eq!(path, "/page/hello%20world");
    }

    #[test]
    fn build_path_appends_unknown_values() {
        let bound = bind(Rule::new("/page/<int:page>", "page")).unwrap();
        let mut values = Values::new();
        values.insert("page".to_owned(), Value::from(2));
        values.insert("q".to_owned(), Value::from("x y"));
        let (_, path) = bound.build_path(&values, true).unwrap().unwrap();
        assert_eq!(path, "/page/2?q=x+y");
    }

    #[test]
    fn build_path_uses_defaults() {
        let bound = bind(Rule::new("/page/<int:page>", "page").default("page", 1)).unwrap();
        let (_, path) = bound.build_path(&Values::new(), true).unwrap().unwrap();
        assert_eq!(path, "/page/1");
    }
}
