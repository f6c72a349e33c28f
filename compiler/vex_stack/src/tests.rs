use super::*;

enum Nested {
    Leaf,
    Wrap(Box<Nested>),
}

fn depth(n: &Nested) -> usize {
    ensure_sufficient_stack(|| match n {
        Nested::Leaf => 0,
        Nested::Wrap(inner) => depth(inner) + 1,
    })
}

#[test]
fn test_shallow_structure() {
    let n = Nested::Wrap(Box::new(Nested::Wrap(Box::new(Nested::Leaf))));
    assert_eq!(depth(&n), 2);
}

#[test]
fn test_deep_structure() {
    let mut n = Nested::Leaf;
    for _ in 0..100_000 {
        n = Nested::Wrap(Box::new(n));
    }
    assert_eq!(depth(&n), 100_000);

    // Unwind iteratively so the default recursive drop doesn't overflow.
    while let Nested::Wrap(inner) = n {
        n = *inner;
    }
}

#[test]
fn test_returns_closure_result() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}
