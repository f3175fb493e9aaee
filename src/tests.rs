// Authors: Robert Lopez

mod util;
