// src/core/updatable.rs

/// Anything that wants a per-frame callback after the terrain has moved.
///
/// Update lists are plain `Vec<Box<dyn Updatable>>` and are driven in
/// insertion order.
pub trait Updatable {
    fn update(&mut self, time_stamp: f64);
}

impl<F> Updatable for F
where
    F: FnMut(f64),
{
    fn update(&mut self, time_stamp: f64) {
        self(time_stamp)
    }
}

/// Drive every entry of an update list, in order.
pub fn update_all(list: &mut [Box<dyn Updatable>], time_stamp: f64) {
    for entry in list.iter_mut() {
        entry.update(time_stamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn update_list_runs_in_insertion_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut list: Vec<Box<dyn Updatable>> = Vec::new();
        for tag in 0..3 {
            let seen = Rc::clone(&seen);
            list.push(Box::new(move |t: f64| seen.borrow_mut().push((tag, t))));
        }

        update_all(&mut list, 16.0);
        assert_eq!(*seen.borrow(), vec![(0, 16.0), (1, 16.0), (2, 16.0)]);
    }
}
