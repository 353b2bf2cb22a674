//! Binary (de)serialization of plain-old-data vectors.
//!
//! Every persisted object decomposes into named `Vec<T: Copy>` components,
//! each stored as its raw bytes in one file inside a directory per object.
//! The layout is only stable within one build of the crate; cross-version
//! compatibility is explicitly not a goal.

use std::{
    fs::{create_dir_all, metadata, File},
    io::{prelude::*, Result},
    mem,
    path::{Path, PathBuf},
    slice,
};

pub trait DataBytes {
    fn data_bytes(&self) -> &[u8];
}

pub trait DataBytesMut {
    fn data_bytes_mut(&mut self) -> &mut [u8];
}

impl<T: Copy> DataBytes for [T] {
    fn data_bytes(&self) -> &[u8] {
        let num_bytes = std::mem::size_of_val(self);
        unsafe { slice::from_raw_parts(self.as_ptr() as *const u8, num_bytes) }
    }
}

impl<T: Copy> DataBytes for Vec<T> {
    fn data_bytes(&self) -> &[u8] {
        self[..].data_bytes()
    }
}

impl<T: Copy> DataBytesMut for Vec<T> {
    fn data_bytes_mut(&mut self) -> &mut [u8] {
        let num_bytes = self.len() * mem::size_of::<T>();
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr() as *mut u8, num_bytes) }
    }
}

pub trait Store: DataBytes {
    fn write_to(&self, path: &Path) -> Result<()> {
        File::create(path)?.write_all(self.data_bytes())
    }
}

impl<T: DataBytes + ?Sized> Store for T {}

pub trait Load: DataBytesMut + Sized {
    fn new_with_bytes(num_bytes: usize) -> Self;

    fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let metadata = metadata(path.as_ref())?;
        let mut file = File::open(path)?;

        let mut object = Self::new_with_bytes(metadata.len() as usize);
        assert_eq!(metadata.len() as usize, object.data_bytes_mut().len());
        file.read_exact(object.data_bytes_mut())?;

        Ok(object)
    }
}

impl<T: Default + Copy> Load for Vec<T> {
    fn new_with_bytes(num_bytes: usize) -> Self {
        assert_eq!(num_bytes % mem::size_of::<T>(), 0);
        let num_elements = num_bytes / mem::size_of::<T>();
        vec![T::default(); num_elements]
    }
}

/// Objects that persist themselves as a set of named components.
pub trait Deconstruct {
    fn store_each(&self, store: &dyn Fn(&str, &dyn Store) -> Result<()>) -> Result<()>;

    fn deconstruct_to<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir: PathBuf = dir.as_ref().into();
        create_dir_all(&dir)?;
        self.store_each(&move |name, object: &dyn Store| object.write_to(&dir.join(name)))
    }
}

#[derive(Debug)]
pub struct Loader<'a> {
    path: &'a Path,
}

impl<'a> Loader<'a> {
    pub fn load<T: Load, P: AsRef<Path>>(&self, name: P) -> Result<T> {
        T::load_from(self.path.join(name))
    }
}

pub trait Reconstruct: Sized {
    fn reconstruct_with(loader: Loader) -> Result<Self>;

    fn reconstruct_from<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::reconstruct_with(Loader { path: dir.as_ref() })
    }
}
