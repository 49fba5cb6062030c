//! DynamicXml - navigate XML documents as nested dynamic objects
//!
//! A document is parsed once into an owned tree. Members are built on first
//! access: a child element with nested elements becomes an [`Element`],
//! text-only children become decoded string leaves, and same-named siblings
//! collapse into an [`Array`].
//!
//! ```text
//! <xml>
//!   <errors><error>E1</error></errors>          errors -> Array[Element, Element]
//!   <errors><error>E2</error><error>E3</error></errors>
//!   <message>hi</message>                       message -> "hi"
//! </xml>
//! ```
//!
//! The same model is exported to the BEAM as `Elixir.DynamicXml.Native`.

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod core;
mod dom;
pub mod error;
pub mod item;
mod memory;
pub mod reader;
mod resource;
mod term;

pub use crate::core::entities::{decode, encode};
pub use dom::ParseOptions;
pub use error::{Error, Result};
pub use item::{Array, Converted, Element, Item, Segment, Shape, Value};
pub use reader::Reader;

use resource::{ReaderRef, ReaderResource};
use term::{PathStep, ShapeArg};

// ============================================================================
// Helpers
// ============================================================================

fn input_str<'b>(input: &'b Binary) -> NifResult<&'b str> {
    std::str::from_utf8(input.as_slice())
        .map_err(|_| rustler::Error::Term(Box::new("input is not valid UTF-8")))
}

fn poisoned(reason: &'static str) -> rustler::Error {
    rustler::Error::Term(Box::new(reason))
}

// ============================================================================
// Memory Tracking NIFs
// ============================================================================

#[rustler::nif]
fn get_rust_memory() -> usize {
    memory::current()
}

#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    memory::peak()
}

#[rustler::nif]
fn reset_rust_memory_stats() -> (usize, usize) {
    memory::reset()
}

// ============================================================================
// Reader Lifecycle
// ============================================================================

/// Create an empty reader (returns ResourceArc)
#[rustler::nif]
fn new() -> ReaderRef {
    ResourceArc::new(ReaderResource::default())
}

/// Parse XML into a new reader (returns {:ok, reader} or {:error, reason})
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let reader: Reader = input_str(&input)?.parse()?;
    let arc = ResourceArc::new(ReaderResource::new(reader));
    Ok((term::ok_term(env), arc).encode(env))
}

/// Replace the reader's document (returns :ok or {:error, reason})
///
/// A document that fails to parse leaves the previous one in place.
#[rustler::nif(schedule = "DirtyCpu")]
fn load<'a>(env: Env<'a>, reader: ReaderRef, input: Binary<'a>) -> NifResult<Term<'a>> {
    let text = input_str(&input)?;
    reader.with_reader_mut(|r| r.load(text)).map_err(poisoned)??;
    Ok(term::ok_term(env))
}

/// Read and load the file at `path`
#[rustler::nif(schedule = "DirtyIo")]
fn load_file<'a>(env: Env<'a>, reader: ReaderRef, path: String) -> NifResult<Term<'a>> {
    reader.with_reader_mut(|r| r.load_file(&path)).map_err(poisoned)??;
    Ok(term::ok_term(env))
}

// ============================================================================
// Navigation
// ============================================================================

/// Walk `path` and return a shallow term, or nil when nothing is there
#[rustler::nif]
fn get<'a>(env: Env<'a>, reader: ReaderRef, path: Vec<PathStep>) -> NifResult<Term<'a>> {
    let path = term::to_segments(path);
    reader
        .with_reader(|r| match term::locate(r, &path)? {
            Some(located) => term::summary_to_term(env, located),
            None => Ok(rustler::types::atom::nil().encode(env)),
        })
        .map_err(poisoned)?
}

/// Walk `path` and return everything below it as maps, lists and binaries
#[rustler::nif(schedule = "DirtyCpu")]
fn fetch<'a>(env: Env<'a>, reader: ReaderRef, path: Vec<PathStep>) -> NifResult<Term<'a>> {
    let path = term::to_segments(path);
    reader
        .with_reader(|r| match term::locate(r, &path)? {
            Some(located) => term::located_to_term(env, located),
            None => Ok(rustler::types::atom::nil().encode(env)),
        })
        .map_err(poisoned)?
}

/// Member names of the element at `path`, or indices of the array there
#[rustler::nif]
fn keys<'a>(env: Env<'a>, reader: ReaderRef, path: Vec<PathStep>) -> NifResult<Term<'a>> {
    let path = term::to_segments(path);
    reader
        .with_reader(|r| match term::locate(r, &path)? {
            Some(located) => term::keys_to_term(env, located),
            None => Ok(Term::list_new_empty(env)),
        })
        .map_err(poisoned)?
}

/// Convert the item at `path` to one of the collection shapes
#[rustler::nif(schedule = "DirtyCpu")]
fn convert<'a>(
    env: Env<'a>,
    reader: ReaderRef,
    path: Vec<PathStep>,
    shape: ShapeArg,
) -> NifResult<Term<'a>> {
    let path = term::to_segments(path);
    reader
        .with_reader(|r| match term::locate(r, &path)? {
            Some(located) => term::convert_to_term(env, located, shape.into()),
            None => Ok(rustler::types::atom::nil().encode(env)),
        })
        .map_err(poisoned)?
}

// ============================================================================
// Entity Codec
// ============================================================================

/// Escape markup characters as XML entities
#[rustler::nif(name = "encode")]
fn encode_text(input: &str) -> String {
    encode(input).into_owned()
}

/// Replace XML entities with the characters they stand for
#[rustler::nif(name = "decode")]
fn decode_text(input: &str) -> String {
    decode(input).into_owned()
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.DynamicXml.Native");
