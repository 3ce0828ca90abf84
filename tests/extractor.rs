// Copyright (c) 2021, BlockProject 3D
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without modification,
// are permitted provided that the following conditions are met:
//
//     * Redistributions of source code must retain the above copyright notice,
//       this list of conditions and the following disclaimer.
//     * Redistributions in binary form must reproduce the above copyright notice,
//       this list of conditions and the following disclaimer in the documentation
//       and/or other materials provided with the distribution.
//     * Neither the name of BlockProject 3D nor the names of its contributors
//       may be used to endorse or promote products derived from this software
//       without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT OWNER OR
// CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
// EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO,
// PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
// PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF
// LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING
// NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE OF THIS
// SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

//! End-to-end path extraction over a document built with the in-memory tree
//! reader, covering the two concrete scenarios from the spec's testable
//! properties that don't require a real byte-level decoder.

use std::cell::RefCell;
use std::rc::Rc;

use ion_core::extractor::{Control, Extractor, ExtractorOptions, PathBuilder};
use ion_core::reader::test_util::{TreeReader, TreeValue};

fn document() -> TreeReader {
    // { abc: def, foo: { bar: [1, 2, 3] } }
    TreeReader::new(vec![TreeValue::Struct(vec![
        ("abc".to_string(), TreeValue::Symbol("def".to_string())),
        (
            "foo".to_string(),
            TreeValue::Struct(vec![(
                "bar".to_string(),
                TreeValue::List(vec![TreeValue::Int(1), TreeValue::Int(2), TreeValue::Int(3)]),
            )]),
        ),
    ])])
}

#[test]
fn ordinal_path_fires_once_on_the_third_list_element() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let path = PathBuilder::new(3, move |reader, _path, _control| {
        seen_clone.borrow_mut().push(reader.read_int()?);
        Ok(())
    })
    .append_field("foo")
    .unwrap()
    .append_field("bar")
    .unwrap()
    .append_ordinal(2)
    .unwrap()
    .build();

    let mut extractor = Extractor::new(ExtractorOptions::default());
    extractor.add_path(path).unwrap();
    extractor.match_document(&mut document()).unwrap();

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0], num_bigint::BigInt::from(3));
}

#[test]
fn wildcard_path_fires_on_every_list_element() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let path = PathBuilder::new(3, move |reader, _path, _control| {
        seen_clone.borrow_mut().push(reader.read_int()?);
        Ok(())
    })
    .append_field("foo")
    .unwrap()
    .append_field("bar")
    .unwrap()
    .append_wildcard()
    .unwrap()
    .build();

    let mut extractor = Extractor::new(ExtractorOptions::default());
    extractor.add_path(path).unwrap();
    extractor.match_document(&mut document()).unwrap();

    let seen = seen.borrow();
    assert_eq!(*seen, vec![1, 2, 3].into_iter().map(num_bigint::BigInt::from).collect::<Vec<_>>());
}

#[test]
fn multiple_paths_fire_independently_in_one_pass() {
    let top_level = Rc::new(RefCell::new(0usize));
    let nested = Rc::new(RefCell::new(Vec::new()));
    let top_level_clone = top_level.clone();
    let nested_clone = nested.clone();

    let zero_length = PathBuilder::new(0, move |_reader, _path, _control| {
        *top_level_clone.borrow_mut() += 1;
        Ok(())
    })
    .build();
    let nested_path = PathBuilder::new(1, move |reader, _path, _control| {
        nested_clone.borrow_mut().push(reader.read_symbol()?.text().unwrap().to_string());
        Ok(())
    })
    .append_field("abc")
    .unwrap()
    .build();

    let mut extractor = Extractor::new(ExtractorOptions::default());
    extractor.add_path(zero_length).unwrap();
    extractor.add_path(nested_path).unwrap();
    extractor.match_document(&mut document()).unwrap();

    assert_eq!(*top_level.borrow(), 1);
    assert_eq!(*nested.borrow(), vec!["def".to_string()]);
}

#[test]
fn step_out_request_skips_remaining_siblings() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = seen.clone();
    let path = PathBuilder::new(2, move |reader, _path, control| {
        seen_clone.borrow_mut().push(reader.read_int()?);
        *control = Control::StepOut(1);
        Ok(())
    })
    .append_field("bar")
    .unwrap()
    .append_wildcard()
    .unwrap()
    .build();

    let mut reader = TreeReader::new(vec![TreeValue::Struct(vec![(
        "bar".to_string(),
        TreeValue::List(vec![TreeValue::Int(1), TreeValue::Int(2), TreeValue::Int(3)]),
    )])]);

    let mut extractor = Extractor::new(ExtractorOptions::default());
    extractor.add_path(path).unwrap();
    extractor.match_document(&mut reader).unwrap();

    assert_eq!(*seen.borrow(), vec![num_bigint::BigInt::from(1)]);
}
