/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by the jpeg codec, the pnm collaborator and the
//! command line tools.
//!
//! It currently contains
//!
//! - A bytestream reader and writer with endian aware reads and writes
//! - Colorspace and bit depth information shared by images
//! - Decoder and encoder options

pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod options;
