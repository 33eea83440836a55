/// Starter snippets selectable from the controls panel.
pub(super) const EXAMPLES: &[(&str, &str)] = &[
    ("hello world", "print(\"Hello, World!\")\n"),
    (
        "function",
        r#"def greet(name):
    return f"Hello, {name}!"

result = greet("Alice")
"#,
    ),
    (
        "class",
        r#"class Person:
    def __init__(self, name, age):
        self.name = name
        self.age = age

    def introduce(self):
        return f"I am {self.name}, {self.age} years old"

p = Person("Bob", 30)
"#,
    ),
    (
        "loop and condition",
        r#"for i in range(10):
    if i % 2 == 0:
        print(f"{i} is even")
    else:
        print(f"{i} is odd")
"#,
    ),
    (
        "lambda",
        r#"numbers = [1, 2, 3, 4, 5]
squared = list(map(lambda x: x ** 2, numbers))
filtered = list(filter(lambda x: x > 5, squared))
"#,
    ),
];
