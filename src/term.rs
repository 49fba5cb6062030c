//! Elixir Term Conversion Utilities
//!
//! Decodes navigation paths and conversion shapes coming from Elixir and
//! encodes item values going back.
//!
//! | Rust                | Elixir                      |
//! |---------------------|-----------------------------|
//! | `Value::Leaf`       | binary                      |
//! | `Element` (shallow) | `{:element, [name, ...]}`   |
//! | `Array` (shallow)   | `{:array, length}`          |
//! | `Element` (deep)    | `%{name => term}`           |
//! | `Array` (deep)      | `[term, ...]`               |
//! | absent              | `nil`                       |

use crate::error::Error;
use crate::item::{Array, Converted, Element, Item, Segment, Shape, Value};
use crate::reader::Reader;
use rustler::types::tuple::make_tuple;
use rustler::{Encoder, Env, NewBinary, NifResult, NifUnitEnum, NifUntaggedEnum, Term};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    element,
    array,
}

/// Path step as sent from Elixir: an integer index or a binary name
#[derive(NifUntaggedEnum)]
pub enum PathStep {
    Index(usize),
    Name(String),
}

impl From<PathStep> for Segment {
    fn from(step: PathStep) -> Self {
        match step {
            PathStep::Index(index) => Segment::Index(index),
            PathStep::Name(name) => Segment::Name(name),
        }
    }
}

pub fn to_segments(path: Vec<PathStep>) -> Vec<Segment> {
    path.into_iter().map(Segment::from).collect()
}

/// Conversion target as sent from Elixir
/// (`:map`, `:list`, `:string_list`, `:array`, `:string_array`)
#[derive(NifUnitEnum, Clone, Copy)]
pub enum ShapeArg {
    Map,
    List,
    StringList,
    Array,
    StringArray,
}

impl From<ShapeArg> for Shape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Map => Shape::Map,
            ShapeArg::List => Shape::ValueList,
            ShapeArg::StringList => Shape::StringList,
            ShapeArg::Array => Shape::ValueArray,
            ShapeArg::StringArray => Shape::StringArray,
        }
    }
}

/// Crate errors come back to Elixir as `{:error, message}`
impl From<Error> for rustler::Error {
    fn from(err: Error) -> Self {
        rustler::Error::Term(Box::new(err.to_string()))
    }
}

/// What a path resolved to: the root element itself, or a value below it
pub enum Located<'r> {
    Root(&'r Element),
    Value(&'r Value),
}

/// Resolve `path` against the reader; an empty path is the root element
pub fn locate<'r>(reader: &'r Reader, path: &[Segment]) -> crate::Result<Option<Located<'r>>> {
    if path.is_empty() {
        return reader.root().map(|root| Some(Located::Root(root)));
    }
    Ok(reader.path(path)?.map(Located::Value))
}

/// Shallow term: nested items are summarized, not walked
pub fn summary_to_term<'a>(env: Env<'a>, located: Located<'_>) -> NifResult<Term<'a>> {
    match located {
        Located::Root(root) => element_summary(env, root),
        Located::Value(Value::Leaf(text)) => Ok(str_to_binary(env, text)),
        Located::Value(Value::Element(el)) => element_summary(env, el),
        Located::Value(Value::Array(arr)) => Ok((array(), arr.len()).encode(env)),
    }
}

fn element_summary<'a>(env: Env<'a>, el: &Element) -> NifResult<Term<'a>> {
    let mut names = Term::list_new_empty(env);
    for name in el.children()?.keys().rev() {
        names = names.list_prepend(str_to_binary(env, name));
    }
    Ok((element(), names).encode(env))
}

/// Deep term: materializes everything below the located item
pub fn located_to_term<'a>(env: Env<'a>, located: Located<'_>) -> NifResult<Term<'a>> {
    match located {
        Located::Root(root) => element_to_term(env, root),
        Located::Value(value) => value_to_term(env, value),
    }
}

pub fn value_to_term<'a>(env: Env<'a>, value: &Value) -> NifResult<Term<'a>> {
    match value {
        Value::Leaf(text) => Ok(str_to_binary(env, text)),
        Value::Element(el) => element_to_term(env, el),
        Value::Array(arr) => array_to_term(env, arr),
    }
}

fn element_to_term<'a>(env: Env<'a>, el: &Element) -> NifResult<Term<'a>> {
    let mut pairs: Vec<(Term, Term)> = Vec::with_capacity(el.len()?);
    for (name, value) in el.entries()? {
        pairs.push((str_to_binary(env, name), value_to_term(env, value)?));
    }
    Term::map_from_pairs(env, &pairs)
}

fn array_to_term<'a>(env: Env<'a>, arr: &Array) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for value in arr.iter()?.rev() {
        list = list.list_prepend(value_to_term(env, value)?);
    }
    Ok(list)
}

/// Names of an element's members, or the indices of an array
pub fn keys_to_term<'a>(env: Env<'a>, located: Located<'_>) -> NifResult<Term<'a>> {
    let el = match located {
        Located::Root(el) | Located::Value(Value::Element(el)) => el,
        Located::Value(Value::Array(arr)) => {
            let indices: Vec<usize> = (0..arr.len()).collect();
            return Ok(indices.encode(env));
        }
        Located::Value(Value::Leaf(_)) => return Ok(Term::list_new_empty(env)),
    };

    let mut names = Term::list_new_empty(env);
    for name in el.children()?.keys().rev() {
        names = names.list_prepend(str_to_binary(env, name));
    }
    Ok(names)
}

/// Convert the located item to `shape` and encode the result
pub fn convert_to_term<'a>(env: Env<'a>, located: Located<'_>, shape: Shape) -> NifResult<Term<'a>> {
    let converted = match located {
        Located::Root(el) | Located::Value(Value::Element(el)) => el.convert(shape)?,
        Located::Value(Value::Array(arr)) => arr.convert(shape)?,
        Located::Value(Value::Leaf(_)) => {
            return Err(Error::ConversionUnsupported {
                from: "Leaf",
                target: shape,
            }
            .into())
        }
    };
    converted_to_term(env, converted)
}

fn converted_to_term<'a>(env: Env<'a>, converted: Converted<'_>) -> NifResult<Term<'a>> {
    match converted {
        Converted::Map(map) => {
            let mut pairs: Vec<(Term, Term)> = Vec::with_capacity(map.len());
            for (name, value) in map {
                pairs.push((str_to_binary(env, name), value_to_term(env, value)?));
            }
            Term::map_from_pairs(env, &pairs)
        }
        Converted::ValueList(values) => Ok(terms_to_list(env, values_to_terms(env, &values)?)),
        Converted::StringList(strings) => Ok(terms_to_list(env, strings_to_terms(env, &strings))),
        Converted::ValueArray(values) => Ok(make_tuple(env, &values_to_terms(env, &values)?)),
        Converted::StringArray(strings) => Ok(make_tuple(env, &strings_to_terms(env, &strings))),
    }
}

fn values_to_terms<'a>(env: Env<'a>, values: &[&Value]) -> NifResult<Vec<Term<'a>>> {
    values.iter().map(|value| value_to_term(env, value)).collect()
}

fn strings_to_terms<'a>(env: Env<'a>, strings: &[String]) -> Vec<Term<'a>> {
    strings.iter().map(|s| str_to_binary(env, s)).collect()
}

/// Build a list without re-encoding each element
fn terms_to_list<'a>(env: Env<'a>, terms: Vec<Term<'a>>) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for term in terms.into_iter().rev() {
        list = list.list_prepend(term);
    }
    list
}

/// `:ok`
pub fn ok_term(env: Env<'_>) -> Term<'_> {
    ok().encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
