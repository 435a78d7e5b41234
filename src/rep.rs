//! The capabilities a value needs before a container can carry it.

use crate::{
    encoding::{Input, Serializer},
    registry::TypeDescriptor,
};
use failure::Error;
use std::fmt::Debug;

/// A value that can write itself to a byte stream and read itself back.
///
/// `read_from` is called on a blank instance and replaces its whole state.
pub trait Streamable {
    /// Writes the value.
    ///
    /// # Arguments
    ///
    /// * `out: &mut dyn Serializer` - Where the encoded value goes.
    fn write_to(&self, out: &mut dyn Serializer) -> Result<(), Error>;

    /// Reads the value, replacing the current state.
    ///
    /// # Arguments
    ///
    /// * `input: &mut Input` - The encoded value, positioned at its first byte.
    fn read_from(&mut self, input: &mut Input) -> Result<(), Error>;

    /// Reads the value from an input that must hold nothing else.
    ///
    /// Types that can stage their state override this so that trailing bytes are
    /// rejected before anything is replaced. The default reads first and checks after.
    fn read_whole(&mut self, input: &mut Input) -> Result<(), Error> {
        self.read_from(input)?;
        input.ensure_exhausted()
    }
}

/// A [`Streamable`] value of a type that is not built in.
///
/// Containers tag such values dynamically, sending the name from
/// [`descriptor`](Writable::descriptor) once in their extension table.
pub trait Writable: Streamable + Debug + Send + Sync {
    /// Describes the concrete type of this value.
    fn descriptor(&self) -> TypeDescriptor;
}
