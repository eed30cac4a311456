//! Converters between raw URL segments and typed values.
//!
//! Every dynamic placeholder in a rule pattern names a converter. A
//! converter contributes the regex fragment accepted at that position,
//! a specificity weight used to rank overlapping rules, and the two
//! codec directions: `to_value` while matching and `to_url` while
//! building. Converters are registered per [`Map`] through plain
//! factory functions; there is no process-wide registry.
//!
//! [`Map`]: ../map/struct.Map.html

use {
    crate::error::{BuildValueError, ValidationError},
    failure::Error,
    indexmap::IndexMap,
    regex::Regex,
    std::{fmt, sync::Arc},
    uuid::Uuid,
};

/// A typed value extracted from (or rendered into) a URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    Uuid(Uuid),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            Value::String(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

/// The variables extracted from a matched path, in capture order.
pub type Values = IndexMap<String, Value>;

/// A codec between one URL segment and a typed value.
///
/// `regex` describes the raw text accepted while matching; `weight`
/// ranks converters so that less permissive patterns win over looser
/// ones; `part_isolating` must return `false` for converters whose
/// regex can consume a `/`, since those cannot form an independent
/// segment transition in the matcher.
pub trait Converter: fmt::Debug + Send + Sync {
    fn regex(&self) -> &str;

    fn weight(&self) -> i64 {
        100
    }

    fn part_isolating(&self) -> bool {
        true
    }

    /// Parses the raw captured text into a typed value.
    fn to_value(&self, raw: &str) -> Result<Value, ValidationError>;

    /// Renders a value into the raw (unencoded) URL fragment.
    fn to_url(&self, value: &Value) -> Result<String, BuildValueError>;
}

/// A factory producing a converter instance from the arguments written
/// in a rule pattern, e.g. `<string(length=4):tag>`.
pub type ConverterFactory =
    Arc<dyn Fn(&ConverterArgs) -> Result<Box<dyn Converter>, Error> + Send + Sync>;

/// The built-in converter table: `default`/`string`, `any`, `path`,
/// `int`, `float`, `uuid` and `regex`.
pub(crate) fn default_converters() -> IndexMap<String, ConverterFactory> {
    let mut converters: IndexMap<String, ConverterFactory> = IndexMap::new();
    let string: ConverterFactory =
        Arc::new(|args| Ok(Box::new(StringConverter::new(args)?) as Box<dyn Converter>));
    converters.insert("default".to_owned(), string.clone());
    converters.insert("string".to_owned(), string);
    converters.insert(
        "any".to_owned(),
        Arc::new(|args| Ok(Box::new(AnyConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters.insert(
        "path".to_owned(),
        Arc::new(|args| Ok(Box::new(PathConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters.insert(
        "int".to_owned(),
        Arc::new(|args| Ok(Box::new(IntegerConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters.insert(
        "float".to_owned(),
        Arc::new(|args| Ok(Box::new(FloatConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters.insert(
        "uuid".to_owned(),
        Arc::new(|args| Ok(Box::new(UuidConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters.insert(
        "regex".to_owned(),
        Arc::new(|args| Ok(Box::new(RegexConverter::new(args)?) as Box<dyn Converter>)),
    );
    converters
}

// ==== converter arguments ====

/// One literal argument inside a placeholder's parenthesized list.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl ArgValue {
    fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Str(..) => "string",
            ArgValue::Int(..) => "integer",
            ArgValue::Float(..) => "float",
            ArgValue::Bool(..) => "boolean",
            ArgValue::None => "none",
        }
    }
}

/// The parsed argument list of a placeholder.
///
/// Accepts comma separated positional and `key=value` entries; values
/// are quoted strings, integers, floats, `True`/`False`/`None`, or bare
/// identifiers. A trailing comma is tolerated. Anything else fails the
/// rule at bind time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverterArgs {
    positional: Vec<ArgValue>,
    keyword: IndexMap<String, ArgValue>,
}

impl ConverterArgs {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut args = ConverterArgs::default();
        let mut parser = ArgParser { input: raw, pos: 0 };

        loop {
            parser.skip_whitespace();
            if parser.at_end() {
                break;
            }

            let value = parser.value()?;
            parser.skip_whitespace();

            if parser.peek() == Some('=') {
                parser.bump();
                parser.skip_whitespace();
                let name = match value {
                    ArgValue::Str(ref name) if is_identifier(name) => name.clone(),
                    other => failure::bail!(
                        "a converter keyword argument requires an identifier name, got {:?}",
                        other
                    ),
                };
                let value = parser.value()?;
                if args.keyword.insert(name.clone(), value).is_some() {
                    failure::bail!("the converter argument {:?} is given twice", name);
                }
                parser.skip_whitespace();
            } else {
                args.positional.push(value);
            }

            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                }
                Some(c) => failure::bail!("unexpected character {:?} in converter arguments", c),
            }
        }

        Ok(args)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    fn lookup(&self, name: &str, position: usize) -> Option<&ArgValue> {
        match self.keyword.get(name) {
            Some(ArgValue::None) | None => match self.positional.get(position) {
                Some(ArgValue::None) | None => None,
                Some(value) => Some(value),
            },
            Some(value) => Some(value),
        }
    }

    pub fn usize_arg(&self, name: &str, position: usize) -> Result<Option<usize>, Error> {
        match self.lookup(name, position) {
            None => Ok(None),
            Some(ArgValue::Int(v)) if *v >= 0 => Ok(Some(*v as usize)),
            Some(other) => failure::bail!(
                "the converter argument {:?} expects a non-negative integer, got a {}",
                name,
                other.type_name()
            ),
        }
    }

    pub fn i64_arg(&self, name: &str, position: usize) -> Result<Option<i64>, Error> {
        match self.lookup(name, position) {
            None => Ok(None),
            Some(ArgValue::Int(v)) => Ok(Some(*v)),
            Some(other) => failure::bail!(
                "the converter argument {:?} expects an integer, got a {}",
                name,
                other.type_name()
            ),
        }
    }

    pub fn f64_arg(&self, name: &str, position: usize) -> Result<Option<f64>, Error> {
        match self.lookup(name, position) {
            None => Ok(None),
            Some(ArgValue::Float(v)) => Ok(Some(*v)),
            Some(ArgValue::Int(v)) => Ok(Some(*v as f64)),
            Some(other) => failure::bail!(
                "the converter argument {:?} expects a number, got a {}",
                name,
                other.type_name()
            ),
        }
    }

    pub fn bool_arg(&self, name: &str, position: usize) -> Result<Option<bool>, Error> {
        match self.lookup(name, position) {
            None => Ok(None),
            Some(ArgValue::Bool(v)) => Ok(Some(*v)),
            Some(other) => failure::bail!(
                "the converter argument {:?} expects True or False, got a {}",
                name,
                other.type_name()
            ),
        }
    }

    pub fn str_arg(&self, name: &str, position: usize) -> Result<Option<&str>, Error> {
        match self.lookup(name, position) {
            None => Ok(None),
            Some(ArgValue::Str(s)) => Ok(Some(s)),
            Some(other) => failure::bail!(
                "the converter argument {:?} expects a string, got a {}",
                name,
                other.type_name()
            ),
        }
    }

    /// All positional arguments rendered as plain strings, for list-like
    /// converters such as `any`.
    pub fn item_strings(&self) -> Result<Vec<String>, Error> {
        self.positional
            .iter()
            .map(|value| match value {
                ArgValue::Str(s) => Ok(s.clone()),
                ArgValue::Int(v) => Ok(v.to_string()),
                ArgValue::Float(v) => Ok(v.to_string()),
                other => failure::bail!(
                    "a {} cannot be used as an enumerated item",
                    other.type_name()
                ),
            })
            .collect()
    }
}

struct ArgParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ArgParser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<ArgValue, Error> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ '"') | Some(quote @ '\'') => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let text = self.input[start..self.pos].to_owned();
                        self.bump();
                        return Ok(ArgValue::Str(text));
                    }
                    self.bump();
                }
                failure::bail!("unterminated string in converter arguments");
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' || c == '+' || c == '-' {
                        self.bump();
                    } else {
                        break;
                    }
                }
                let token = &self.input[start..self.pos];
                if token.is_empty() {
                    failure::bail!(
                        "unexpected character {:?} in converter arguments",
                        self.peek().unwrap_or('?')
                    );
                }
                Ok(interpret_bare(token)?)
            }
        }
    }
}

fn interpret_bare(token: &str) -> Result<ArgValue, Error> {
    match token {
        "True" => return Ok(ArgValue::Bool(true)),
        "False" => return Ok(ArgValue::Bool(false)),
        "None" => return Ok(ArgValue::None),
        _ => {}
    }
    if let Ok(v) = token.parse::<i64>() {
        return Ok(ArgValue::Int(v));
    }
    if let Ok(v) = token.parse::<f64>() {
        return Ok(ArgValue::Float(v));
    }
    if is_identifier(token) {
        return Ok(ArgValue::Str(token.to_owned()));
    }
    failure::bail!("malformed converter argument {:?}", token)
}

pub(crate) fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ==== built-in converters ====

/// The default converter: any text without a slash, with optional
/// `minlength`, `maxlength` and `length` constraints.
#[derive(Debug)]
pub struct StringConverter {
    regex: String,
}

impl StringConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        let minlength = args.usize_arg("minlength", 0)?.unwrap_or(1);
        let maxlength = args.usize_arg("maxlength", 1)?;
        let length = args.usize_arg("length", 2)?;

        let quantifier = if let Some(length) = length {
            format!("{{{}}}", length)
        } else {
            match maxlength {
                Some(maxlength) => format!("{{{},{}}}", minlength, maxlength),
                None => format!("{{{},}}", minlength),
            }
        };
        Ok(StringConverter {
            regex: format!("[^/]{}", quantifier),
        })
    }
}

impl Converter for StringConverter {
    fn regex(&self) -> &str {
        &self.regex
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        Ok(value.to_string())
    }
}

/// Matches one of a fixed set of literal items.
#[derive(Debug)]
pub struct AnyConverter {
    items: Vec<String>,
    regex: String,
}

impl AnyConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        let items = args.item_strings()?;
        if items.is_empty() {
            failure::bail!("the 'any' converter expects at least one item");
        }
        let regex = format!(
            "(?:{})",
            items
                .iter()
                .map(|item| regex::escape(item))
                .collect::<Vec<_>>()
                .join("|")
        );
        Ok(AnyConverter { items, regex })
    }
}

impl Converter for AnyConverter {
    fn regex(&self) -> &str {
        &self.regex
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        let rendered = value.to_string();
        if self.items.iter().any(|item| *item == rendered) {
            Ok(rendered)
        } else {
            let valid = self
                .items
                .iter()
                .map(|item| format!("'{}'", item))
                .collect::<Vec<_>>()
                .join(", ");
            Err(BuildValueError::Invalid(format!(
                "'{}' is not one of {}",
                rendered, valid
            )))
        }
    }
}

/// Like the default converter, but accepts slashes. The least specific
/// converter; it cannot form an isolated segment transition.
#[derive(Debug)]
pub struct PathConverter {
    _priv: (),
}

impl PathConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        if !args.is_empty() {
            failure::bail!("the 'path' converter takes no arguments");
        }
        Ok(PathConverter { _priv: () })
    }
}

impl Converter for PathConverter {
    fn regex(&self) -> &str {
        "[^/].*?"
    }

    fn weight(&self) -> i64 {
        200
    }

    fn part_isolating(&self) -> bool {
        false
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        Ok(value.to_string())
    }
}

/// Matches (optionally signed, optionally fixed-width) integers.
#[derive(Debug)]
pub struct IntegerConverter {
    fixed_digits: usize,
    min: Option<i64>,
    max: Option<i64>,
    regex: &'static str,
}

impl IntegerConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        let fixed_digits = args.usize_arg("fixed_digits", 0)?.unwrap_or(0);
        let min = args.i64_arg("min", 1)?;
        let max = args.i64_arg("max", 2)?;
        let signed = args.bool_arg("signed", 3)?.unwrap_or(false);
        Ok(IntegerConverter {
            fixed_digits,
            min,
            max,
            regex: if signed { r"-?\d+" } else { r"\d+" },
        })
    }

    fn in_bounds(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl Converter for IntegerConverter {
    fn regex(&self) -> &str {
        self.regex
    }

    fn weight(&self) -> i64 {
        50
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        if self.fixed_digits > 0 && raw.len() != self.fixed_digits {
            return Err(ValidationError);
        }
        let value: i64 = raw.parse().map_err(|_| ValidationError)?;
        if !self.in_bounds(value) {
            return Err(ValidationError);
        }
        Ok(Value::Int(value))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        let value = value.as_int().ok_or(BuildValueError::Mismatch)?;
        if !self.in_bounds(value) {
            return Err(BuildValueError::Mismatch);
        }
        if self.fixed_digits > 0 {
            Ok(format!("{:0width$}", value, width = self.fixed_digits))
        } else {
            Ok(value.to_string())
        }
    }
}

/// Matches (optionally signed) floating point numbers with a decimal
/// point.
#[derive(Debug)]
pub struct FloatConverter {
    min: Option<f64>,
    max: Option<f64>,
    regex: &'static str,
}

impl FloatConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        let min = args.f64_arg("min", 0)?;
        let max = args.f64_arg("max", 1)?;
        let signed = args.bool_arg("signed", 2)?.unwrap_or(false);
        Ok(FloatConverter {
            min,
            max,
            regex: if signed { r"-?\d+\.\d+" } else { r"\d+\.\d+" },
        })
    }

    fn in_bounds(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl Converter for FloatConverter {
    fn regex(&self) -> &str {
        self.regex
    }

    fn weight(&self) -> i64 {
        50
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        let value: f64 = raw.parse().map_err(|_| ValidationError)?;
        if !self.in_bounds(value) {
            return Err(ValidationError);
        }
        Ok(Value::Float(value))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        let value = value.as_float().ok_or(BuildValueError::Mismatch)?;
        if !self.in_bounds(value) {
            return Err(BuildValueError::Mismatch);
        }
        let mut rendered = value.to_string();
        if !rendered.contains('.') {
            // keep the rendered form inside this converter's own regex
            rendered.push_str(".0");
        }
        Ok(rendered)
    }
}

/// Matches hyphenated UUIDs.
#[derive(Debug)]
pub struct UuidConverter {
    _priv: (),
}

impl UuidConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        if !args.is_empty() {
            failure::bail!("the 'uuid' converter takes no arguments");
        }
        Ok(UuidConverter { _priv: () })
    }
}

impl Converter for UuidConverter {
    fn regex(&self) -> &str {
        "[A-Fa-f0-9]{8}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{4}-[A-Fa-f0-9]{12}"
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Uuid::parse_str(raw)
            .map(Value::Uuid)
            .map_err(|_| ValidationError)
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        value
            .as_uuid()
            .map(|uuid| uuid.to_string())
            .ok_or(BuildValueError::Mismatch)
    }
}

/// Matches an arbitrary caller-supplied regex. Not part isolating, as
/// the pattern may consume slashes.
#[derive(Debug)]
pub struct RegexConverter {
    regex: String,
}

impl RegexConverter {
    pub fn new(args: &ConverterArgs) -> Result<Self, Error> {
        let pattern = match args.str_arg("pattern", 0)? {
            Some(pattern) => pattern.to_owned(),
            None => failure::bail!("the 'regex' converter expects a pattern argument"),
        };
        Regex::new(&pattern)
            .map_err(|e| failure::format_err!("invalid pattern for the 'regex' converter: {}", e))?;
        Ok(RegexConverter { regex: pattern })
    }
}

impl Converter for RegexConverter {
    fn regex(&self) -> &str {
        &self.regex
    }

    fn part_isolating(&self) -> bool {
        false
    }

    fn to_value(&self, raw: &str) -> Result<Value, ValidationError> {
        Ok(Value::String(raw.to_owned()))
    }

    fn to_url(&self, value: &Value) -> Result<String, BuildValueError> {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &str) -> ConverterArgs {
        ConverterArgs::parse(raw).unwrap()
    }

    #[test]
    fn parse_positional_and_keyword() {
        let parsed = args("about, 'foo, bar', 42, 1.5, True, length=4, name='x'");
        assert_eq!(
            parsed.positional,
            vec![
                ArgValue::Str("about".into()),
                ArgValue::Str("foo, bar".into()),
                ArgValue::Int(42),
                ArgValue::Float(1.5),
                ArgValue::Bool(true),
            ]
        );
        assert_eq!(parsed.keyword.get("length"), Some(&ArgValue::Int(4)));
        assert_eq!(
            parsed.keyword.get("name"),
            Some(&ArgValue::Str("x".into()))
        );
    }

    #[test]
    fn parse_trailing_comma_and_none() {
        let parsed = args("min=None, max=10,");
        assert_eq!(parsed.i64_arg("min", 0).unwrap(), None);
        assert_eq!(parsed.i64_arg("max", 1).unwrap(), Some(10));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ConverterArgs::parse("a;b").is_err());
        assert!(ConverterArgs::parse("'unterminated").is_err());
        assert!(ConverterArgs::parse("a b").is_err());
        assert!(ConverterArgs::parse("length=4, length=5").is_err());
    }

    #[test]
    fn argument_type_mismatch() {
        assert!(args("minlength='x'").usize_arg("minlength", 0).is_err());
        assert!(args("signed=1").bool_arg("signed", 0).is_err());
    }

    #[test]
    fn string_converter_regex() {
        assert_eq!(StringConverter::new(&args("")).unwrap().regex(), "[^/]{1,}");
        assert_eq!(
            StringConverter::new(&args("minlength=2, maxlength=5"))
                .unwrap()
                .regex(),
            "[^/]{2,5}"
        );
        assert_eq!(
            StringConverter::new(&args("length=4")).unwrap().regex(),
            "[^/]{4}"
        );
    }

    #[test]
    fn integer_converter() {
        let plain = IntegerConverter::new(&args("")).unwrap();
        assert_eq!(plain.regex(), r"\d+");
        assert_eq!(plain.to_value("42").unwrap(), Value::Int(42));
        assert_eq!(plain.to_url(&Value::Int(42)).unwrap(), "42");

        let signed = IntegerConverter::new(&args("signed=True")).unwrap();
        assert_eq!(signed.regex(), r"-?\d+");
        assert_eq!(signed.to_value("-3").unwrap(), Value::Int(-3));

        let bounded = IntegerConverter::new(&args("min=10, max=20")).unwrap();
        assert!(bounded.to_value("5").is_err());
        assert_eq!(bounded.to_value("15").unwrap(), Value::Int(15));
        assert_eq!(
            bounded.to_url(&Value::Int(5)),
            Err(BuildValueError::Mismatch)
        );

        let fixed = IntegerConverter::new(&args("fixed_digits=4")).unwrap();
        assert!(fixed.to_value("42").is_err());
        assert_eq!(fixed.to_value("0042").unwrap(), Value::Int(42));
        assert_eq!(fixed.to_url(&Value::Int(42)).unwrap(), "0042");
    }

    #[test]
    fn float_converter() {
        let plain = FloatConverter::new(&args("")).unwrap();
        assert_eq!(plain.to_value("1.5").unwrap(), Value::Float(1.5));
        assert_eq!(plain.to_url(&Value::Float(1.5)).unwrap(), "1.5");
        // a whole number must still render with a decimal point
        assert_eq!(plain.to_url(&Value::Float(1.0)).unwrap(), "1.0");
    }

    #[test]
    fn any_converter() {
        let conv = AnyConverter::new(&args("about, help")).unwrap();
        assert_eq!(conv.regex(), "(?:about|help)");
        assert_eq!(conv.to_url(&Value::from("about")).unwrap(), "about");
        match conv.to_url(&Value::from("imprint")) {
            Err(BuildValueError::Invalid(message)) => {
                assert_eq!(message, "'imprint' is not one of 'about', 'help'");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn uuid_converter() {
        let conv = UuidConverter::new(&args("")).unwrap();
        let parsed = conv
            .to_value("550e8400-e29b-41d4-a716-446655440000")
            .unwrap();
        match &parsed {
            Value::Uuid(uuid) => {
                assert_eq!(uuid.to_string(), "550e8400-e29b-41d4-a716-446655440000")
            }
            other => panic!("unexpected value: {:?}", other),
        }
        assert_eq!(
            conv.to_url(&parsed).unwrap(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert!(conv.to_value("not-a-uuid").is_err());
    }

    #[test]
    fn regex_converter_validates_pattern() {
        assert!(RegexConverter::new(&args("'[a-z]+(/[a-z]+)*'")).is_ok());
        assert!(RegexConverter::new(&args("'(unclosed'")).is_err());
        assert!(RegexConverter::new(&args("")).is_err());
    }

    #[test]
    fn path_converter_flags() {
        let conv = PathConverter::new(&args("")).unwrap();
        assert!(!conv.part_isolating());
        assert_eq!(conv.weight(), 200);
    }
}
